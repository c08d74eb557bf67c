//! Broker profile entity definitions

use serde::{Deserialize, Serialize};

/// Public-facing profile of an admin account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerProfile {
    /// Public id of the owning user.
    pub id: String,
    #[serde(skip_serializing, default)]
    pub user_id: i64,
    pub name: String,
    pub creci: String,
    /// Digits only.
    pub phone: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub whatsapp: Option<String>,
    pub facebook_username: Option<String>,
    pub instagram_username: Option<String>,
    pub schedule: WeeklySchedule,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrokerProfileUpdate {
    pub name: String,
    pub creci: String,
    pub phone: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub whatsapp: Option<String>,
    pub facebook_username: Option<String>,
    pub instagram_username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub active: bool,
    pub start: String,
    pub end: String,
}

impl DaySchedule {
    pub fn open(start: &str, end: &str) -> Self {
        Self {
            active: true,
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn closed() -> Self {
        Self {
            active: false,
            start: "08:00".to_string(),
            end: "18:00".to_string(),
        }
    }
}

/// Weekly availability, one entry per weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklySchedule {
    pub monday: DaySchedule,
    pub tuesday: DaySchedule,
    pub wednesday: DaySchedule,
    pub thursday: DaySchedule,
    pub friday: DaySchedule,
    pub saturday: DaySchedule,
    pub sunday: DaySchedule,
}

impl WeeklySchedule {
    /// Days paired with their field names, monday first.
    pub fn days(&self) -> [(&'static str, &DaySchedule); 7] {
        [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
            ("sunday", &self.sunday),
        ]
    }
}

impl Default for WeeklySchedule {
    /// Monday to friday 08:00-18:00, saturday morning, closed on sunday.
    fn default() -> Self {
        Self {
            monday: DaySchedule::open("08:00", "18:00"),
            tuesday: DaySchedule::open("08:00", "18:00"),
            wednesday: DaySchedule::open("08:00", "18:00"),
            thursday: DaySchedule::open("08:00", "18:00"),
            friday: DaySchedule::open("08:00", "18:00"),
            saturday: DaySchedule::open("08:00", "12:00"),
            sunday: DaySchedule::closed(),
        }
    }
}
