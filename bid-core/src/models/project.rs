use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ongoing works contract. Monetary values are in Crores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    pub participation_percentage: Decimal,
    #[serde(default, with = "blank_date")]
    pub start_date: Option<NaiveDate>,
    pub construction_period_months: Decimal,
    pub contract_value: Decimal,
    pub completed_value: Decimal,
    #[serde(default, with = "blank_date")]
    pub anticipated_completion_date: Option<NaiveDate>,
}

impl Project {
    /// An empty project ready for data entry: full participation, a
    /// twelve-month period, zero values and no dates.
    pub fn skeleton() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            participation_percentage: dec!(100),
            start_date: None,
            construction_period_months: dec!(12),
            contract_value: Decimal::ZERO,
            completed_value: Decimal::ZERO,
            anticipated_completion_date: None,
        }
    }
}

/// Unset dates travel as `""`; `null` is accepted on the way in.
mod blank_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s {
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => {
                // Accept full timestamps too; only the calendar day matters.
                let day = s.trim().get(..10).unwrap_or(s.trim());
                NaiveDate::parse_from_str(day, FORMAT)
                    .map(Some)
                    .map_err(serde::de::Error::custom)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn skeleton_has_entry_defaults() {
        let project = Project::skeleton();

        assert_eq!(project.name, "");
        assert_eq!(project.participation_percentage, dec!(100));
        assert_eq!(project.construction_period_months, dec!(12));
        assert_eq!(project.contract_value, Decimal::ZERO);
        assert_eq!(project.completed_value, Decimal::ZERO);
        assert_eq!(project.start_date, None);
        assert_eq!(project.anticipated_completion_date, None);
    }

    #[test]
    fn skeletons_get_distinct_ids() {
        assert_ne!(Project::skeleton().id, Project::skeleton().id);
    }

    #[test]
    fn blank_and_null_dates_decode_as_unset() {
        let stored = json!({
            "id": "5f1c2a8e-9d3b-4c7a-8e21-0a6b3f4d5e6f",
            "name": "Ring Road",
            "participationPercentage": 100,
            "startDate": "",
            "constructionPeriodMonths": 12,
            "contractValue": 50,
            "completedValue": 10,
            "anticipatedCompletionDate": null
        });

        let project: Project = serde_json::from_value(stored).unwrap();

        assert_eq!(project.start_date, None);
        assert_eq!(project.anticipated_completion_date, None);
        assert_eq!(project.contract_value, dec!(50));
    }

    #[test]
    fn dates_serialize_as_iso_days() {
        let project = Project {
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            ..Project::skeleton()
        };

        let value = serde_json::to_value(&project).unwrap();

        assert_eq!(value["startDate"], json!("2024-04-01"));
        assert_eq!(value["anticipatedCompletionDate"], json!(""));
    }

    #[test]
    fn timestamp_dates_keep_the_calendar_day() {
        let stored = json!({
            "id": "5f1c2a8e-9d3b-4c7a-8e21-0a6b3f4d5e6f",
            "participationPercentage": 100,
            "startDate": "2023-01-15T00:00:00.000Z",
            "constructionPeriodMonths": 12,
            "contractValue": 0,
            "completedValue": 0,
            "anticipatedCompletionDate": "2025-06-30"
        });

        let project: Project = serde_json::from_value(stored).unwrap();

        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2023, 1, 15));
        assert_eq!(project.name, "");
    }
}
