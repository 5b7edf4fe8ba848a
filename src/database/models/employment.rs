use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employment {
    pub id: i32,
    pub company: String,
    pub position: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub profile_id: i32,
}

/// Employment content with the active/end-date invariant already applied:
/// `is_active` implies `end_date == None`, otherwise `end_date` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmploymentDraft {
    company: String,
    position: String,
    description: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmploymentRuleViolation {
    MissingEndDate,
    EndBeforeStart,
}

impl EmploymentDraft {
    pub fn new(
        company: String,
        position: String,
        description: String,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        is_active: bool,
    ) -> Result<Self, EmploymentRuleViolation> {
        let end_date = if is_active {
            None
        } else {
            let end = end_date.ok_or(EmploymentRuleViolation::MissingEndDate)?;
            if end < start_date {
                return Err(EmploymentRuleViolation::EndBeforeStart);
            }
            Some(end)
        };

        Ok(Self {
            company,
            position,
            description,
            start_date,
            end_date,
        })
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }

    pub fn into_employment(self, id: i32, profile_id: i32) -> Employment {
        let is_active = self.is_active();
        Employment {
            id,
            company: self.company,
            position: self.position,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            is_active,
            profile_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn draft(end: Option<&str>, active: bool) -> Result<EmploymentDraft, EmploymentRuleViolation> {
        EmploymentDraft::new(
            "Acme".into(),
            "Engineer".into(),
            "Built things".into(),
            date("2021-01-01"),
            end.map(date),
            active,
        )
    }

    #[test]
    fn active_employment_drops_end_date() {
        let d = draft(Some("2022-01-01"), true).unwrap();
        assert_eq!(d.end_date(), None);
        assert!(d.is_active());
    }

    #[test]
    fn inactive_employment_requires_end_date() {
        assert_eq!(draft(None, false), Err(EmploymentRuleViolation::MissingEndDate));
    }

    #[test]
    fn end_date_cannot_precede_start() {
        assert_eq!(draft(Some("2020-12-31"), false), Err(EmploymentRuleViolation::EndBeforeStart));
        assert!(draft(Some("2021-01-01"), false).is_ok());
    }
}
