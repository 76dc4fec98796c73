//! Form input types and their validation.
//!
//! Validation runs before any write and never touches the database. Each
//! `validate` returns a normalized copy (names trimmed, mobiles trimmed,
//! ward lists sorted) that the services persist as-is.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::util::{clean_name, non_empty, parse_date};

fn mobile_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("mobile regex should compile"))
}

/// Trim and check a mobile number is exactly ten digits.
pub fn validate_mobile(mobile: &str) -> Result<String, AppError> {
    let trimmed = mobile.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Mobile number is required"));
    }
    if !mobile_pattern().is_match(trimmed) {
        return Err(AppError::validation("Mobile number must be exactly 10 digits"));
    }
    Ok(trimmed.to_string())
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let cleaned = clean_name(value);
    if cleaned.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(cleaned)
}

fn required_id(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("Select a {field}")));
    }
    Ok(trimmed.to_string())
}

/// Upper bound on a panchayath's ward count. Matches the schema CHECK.
pub const MAX_WARDS: u32 = 100;

/// Wards selectable for a panchayath with `ward_count` wards.
pub fn ward_options(ward_count: u32) -> Vec<u32> {
    (1..=ward_count.min(MAX_WARDS)).collect()
}

pub fn validate_ward(ward: u32, ward_count: u32) -> Result<u32, AppError> {
    if ward == 0 || ward > ward_count {
        return Err(AppError::validation(format!(
            "Ward must be between 1 and {ward_count}"
        )));
    }
    Ok(ward)
}

/// Panchayath + ward picker state shared by every role form.
///
/// Choosing a different panchayath clears the chosen ward, since ward
/// numbers only mean something within one panchayath.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardSelection {
    pub panchayath_id: Option<String>,
    pub ward: Option<u32>,
}

impl WardSelection {
    pub fn select_panchayath(&mut self, panchayath_id: &str) {
        if self.panchayath_id.as_deref() != Some(panchayath_id) {
            self.panchayath_id = Some(panchayath_id.to_string());
            self.ward = None;
        }
    }

    pub fn select_ward(&mut self, ward: u32) {
        self.ward = Some(ward);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanchayathForm {
    pub name: String,
    pub number_of_wards: u32,
}

impl PanchayathForm {
    pub fn validate(&self) -> Result<Self, AppError> {
        let name = required("Panchayath name", &self.name)?;
        if !(1..=MAX_WARDS).contains(&self.number_of_wards) {
            return Err(AppError::validation(format!(
                "Number of wards must be between 1 and {MAX_WARDS}"
            )));
        }
        Ok(Self {
            name,
            number_of_wards: self.number_of_wards,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorForm {
    pub panchayath_id: String,
    pub name: String,
    pub mobile_number: String,
    pub ward: u32,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl CoordinatorForm {
    pub fn validate(&self, ward_count: u32) -> Result<Self, AppError> {
        let panchayath_id = required_id("panchayath", &self.panchayath_id)?;
        let name = required("Name", &self.name)?;
        let mobile_number = validate_mobile(&self.mobile_number)?;
        let ward = validate_ward(self.ward, ward_count)?;
        if let Some(r) = self.rating {
            if r > 10 {
                return Err(AppError::validation("Rating must be between 0 and 10"));
            }
        }
        Ok(Self {
            panchayath_id,
            name,
            mobile_number,
            ward,
            rating: self.rating,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorForm {
    pub panchayath_id: String,
    pub coordinator_id: String,
    pub name: String,
    pub mobile_number: String,
    pub wards: Vec<u32>,
}

impl SupervisorForm {
    pub fn validate(&self, ward_count: u32) -> Result<Self, AppError> {
        let panchayath_id = required_id("panchayath", &self.panchayath_id)?;
        let coordinator_id = required_id("coordinator", &self.coordinator_id)?;
        let name = required("Name", &self.name)?;
        let mobile_number = validate_mobile(&self.mobile_number)?;
        if self.wards.is_empty() {
            return Err(AppError::validation("Select at least one ward"));
        }
        let mut wards = self
            .wards
            .iter()
            .map(|&w| validate_ward(w, ward_count))
            .collect::<Result<Vec<_>, _>>()?;
        wards.sort_unstable();
        wards.dedup();
        Ok(Self {
            panchayath_id,
            coordinator_id,
            name,
            mobile_number,
            wards,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupLeaderForm {
    pub panchayath_id: String,
    pub supervisor_id: String,
    pub name: String,
    pub mobile_number: String,
    pub ward: u32,
}

impl GroupLeaderForm {
    pub fn validate(&self, ward_count: u32) -> Result<Self, AppError> {
        Ok(Self {
            panchayath_id: required_id("panchayath", &self.panchayath_id)?,
            supervisor_id: required_id("supervisor", &self.supervisor_id)?,
            name: required("Name", &self.name)?,
            mobile_number: validate_mobile(&self.mobile_number)?,
            ward: validate_ward(self.ward, ward_count)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProForm {
    pub panchayath_id: String,
    pub group_leader_id: String,
    pub name: String,
    pub mobile_number: String,
    pub ward: u32,
}

impl ProForm {
    pub fn validate(&self, ward_count: u32) -> Result<Self, AppError> {
        Ok(Self {
            panchayath_id: required_id("panchayath", &self.panchayath_id)?,
            group_leader_id: required_id("group leader", &self.group_leader_id)?,
            name: required("Name", &self.name)?,
            mobile_number: validate_mobile(&self.mobile_number)?,
            ward: validate_ward(self.ward, ward_count)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyNoteForm {
    pub mobile_number: String,
    pub date: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub is_leave: bool,
}

impl DailyNoteForm {
    pub fn validate(&self) -> Result<Self, AppError> {
        let mobile_number = validate_mobile(&self.mobile_number)?;
        let date = parse_date(&self.date)
            .ok_or_else(|| AppError::validation("Date must be in YYYY-MM-DD format"))?
            .format("%Y-%m-%d")
            .to_string();
        let activity = self.activity.trim().to_string();
        if !self.is_leave && activity.is_empty() {
            return Err(AppError::validation(
                "Describe the day's activity or mark the day as leave",
            ));
        }
        Ok(Self {
            mobile_number,
            date,
            activity,
            is_leave: self.is_leave,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialForm {
    pub agent_mobile: String,
    pub respondent_name: String,
    #[serde(default)]
    pub respondent_mobile: Option<String>,
    pub score: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

impl TestimonialForm {
    pub fn validate(&self) -> Result<Self, AppError> {
        let agent_mobile = validate_mobile(&self.agent_mobile)?;
        let respondent_name = required("Your name", &self.respondent_name)?;
        let respondent_mobile = match non_empty(self.respondent_mobile.as_deref()) {
            Some(m) => Some(validate_mobile(&m)?),
            None => None,
        };
        if !(1..=5).contains(&self.score) {
            return Err(AppError::validation("Score must be between 1 and 5"));
        }
        Ok(Self {
            agent_mobile,
            respondent_name,
            respondent_mobile,
            score: self.score,
            comment: non_empty(self.comment.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mobile() {
        assert_eq!(validate_mobile(" 9876543210 ").unwrap(), "9876543210");
        assert!(validate_mobile("987654321").is_err());
        assert!(validate_mobile("98765432100").is_err());
        assert!(validate_mobile("98765x3210").is_err());
        assert!(validate_mobile("").is_err());
    }

    #[test]
    fn test_ward_options_are_inclusive() {
        assert_eq!(ward_options(5), vec![1, 2, 3, 4, 5]);
        assert!(ward_options(0).is_empty());
        assert!(validate_ward(5, 5).is_ok());
        assert!(validate_ward(0, 5).is_err());
        assert!(validate_ward(6, 5).is_err());
    }

    #[test]
    fn test_ward_count_is_bounded() {
        let form = |n| PanchayathForm {
            name: "Kadirur".into(),
            number_of_wards: n,
        };
        assert!(form(0).validate().is_err());
        assert!(form(MAX_WARDS).validate().is_ok());
        assert!(form(MAX_WARDS + 1).validate().is_err());
        assert!(form(u32::MAX).validate().is_err());
        assert_eq!(ward_options(u32::MAX).len(), MAX_WARDS as usize);
    }

    #[test]
    fn test_changing_panchayath_clears_ward() {
        let mut sel = WardSelection::default();
        sel.select_panchayath("p1");
        sel.select_ward(3);
        sel.select_panchayath("p1");
        assert_eq!(sel.ward, Some(3), "re-selecting the same panchayath keeps the ward");
        sel.select_panchayath("p2");
        assert_eq!(sel.ward, None);
        assert_eq!(sel.panchayath_id.as_deref(), Some("p2"));
    }

    #[test]
    fn test_coordinator_form() {
        let form = CoordinatorForm {
            panchayath_id: "p1".into(),
            name: "  Asha ".into(),
            mobile_number: "9876543210".into(),
            ward: 2,
            rating: Some(8),
        };
        let ok = form.validate(5).unwrap();
        assert_eq!(ok.name, "Asha");

        let bad_rating = CoordinatorForm { rating: Some(11), ..form.clone() };
        assert!(bad_rating.validate(5).is_err());
        let missing_name = CoordinatorForm { name: " ".into(), ..form.clone() };
        assert!(matches!(missing_name.validate(5), Err(AppError::Validation(m)) if m.contains("Name")));
        assert!(form.validate(1).is_err(), "ward 2 out of range for 1 ward");
    }

    #[test]
    fn test_supervisor_wards_sorted_and_required() {
        let form = SupervisorForm {
            panchayath_id: "p1".into(),
            coordinator_id: "c1".into(),
            name: "Biju".into(),
            mobile_number: "9876543211".into(),
            wards: vec![3, 2, 3],
        };
        assert_eq!(form.validate(5).unwrap().wards, vec![2, 3]);
        let none = SupervisorForm { wards: vec![], ..form.clone() };
        assert!(none.validate(5).is_err());
        let out = SupervisorForm { wards: vec![2, 9], ..form };
        assert!(out.validate(5).is_err());
    }

    #[test]
    fn test_daily_note_activity_rules() {
        let leave = DailyNoteForm {
            mobile_number: "9876543210".into(),
            date: "2024-05-01".into(),
            activity: String::new(),
            is_leave: true,
        };
        assert!(leave.validate().is_ok());
        let work = DailyNoteForm { is_leave: false, ..leave.clone() };
        assert!(work.validate().is_err());
        let bad_date = DailyNoteForm { date: "1/5/2024".into(), ..leave };
        assert!(bad_date.validate().is_err());
    }

    #[test]
    fn test_testimonial_score_range() {
        let form = TestimonialForm {
            agent_mobile: "9876543210".into(),
            respondent_name: "Ravi".into(),
            respondent_mobile: Some(" ".into()),
            score: 5,
            comment: Some("".into()),
        };
        let ok = form.validate().unwrap();
        assert_eq!(ok.respondent_mobile, None);
        assert_eq!(ok.comment, None);
        assert!(TestimonialForm { score: 0, ..form.clone() }.validate().is_err());
        assert!(TestimonialForm { score: 6, ..form }.validate().is_err());
    }
}
