//! Restaurant (tenant) Model

use chrono::{FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default timezone for new restaurants
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Tenant lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum RestaurantStatus {
    Active,
    Suspended,
}

impl RestaurantStatus {
    /// Can users of this restaurant log in?
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// UTC offset (`+05:30`, `-03:00` or `UTC`), used for "today" in attendance
    pub timezone: String,
    pub status: RestaurantStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Restaurant {
    /// Local calendar date at `now` (Unix millis)
    pub fn local_date(&self, now: i64) -> NaiveDate {
        local_date(&self.timezone, now)
    }
}

/// Parse `UTC`, `Z` or `±HH:MM` into a fixed offset
pub fn parse_utc_offset(tz: &str) -> Option<FixedOffset> {
    let tz = tz.trim();
    if tz.eq_ignore_ascii_case("utc") || tz == "Z" {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match tz.as_bytes().first()? {
        b'+' => (1, &tz[1..]),
        b'-' => (-1, &tz[1..]),
        _ => return None,
    };
    let (h, m) = rest.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    let h: i32 = h.parse().ok()?;
    let m: i32 = m.parse().ok()?;
    if h > 14 || m > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (h * 3600 + m * 60))
}

/// Local date for a timezone string; unknown zones fall back to UTC
pub fn local_date(tz: &str, now: i64) -> NaiveDate {
    let utc = chrono::DateTime::from_timestamp_millis(now).unwrap_or_default();
    match parse_utc_offset(tz) {
        Some(offset) => utc.with_timezone(&offset).date_naive(),
        None => utc.date_naive(),
    }
}

/// First admin account created together with a restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub timezone: Option<String>,
    pub admin: AdminSeed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantStatusUpdate {
    pub status: RestaurantStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestaurantQuery {
    pub status: Option<RestaurantStatus>,
    pub search: Option<String>,
}

/// Restaurant created together with its admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCreated {
    pub restaurant: Restaurant,
    pub admin: super::User,
}

/// Superadmin overview row (one per restaurant)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RestaurantOverview {
    pub id: i64,
    pub name: String,
    pub status: RestaurantStatus,
    pub employees: i64,
    pub open_tasks: i64,
    pub pending_requests: i64,
    pub payroll_net: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_utc_offset("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_utc_offset("-03:00").unwrap().local_minus_utc(), -10_800);
        assert!(parse_utc_offset("Europe/Paris").is_none());
        assert!(parse_utc_offset("+5:30").is_none());
        assert!(parse_utc_offset("+15:00").is_none());
    }

    #[test]
    fn local_date_crosses_midnight() {
        // 2026-10-15T22:30:00Z
        let now = 1_792_103_400_000;
        assert_eq!(local_date("UTC", now), NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        assert_eq!(local_date("+02:00", now), NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(local_date("bogus", now), NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
    }
}
