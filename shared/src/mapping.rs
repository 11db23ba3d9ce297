//! Conversions between sea-orm records and domain models.
//!
//! Each aggregate has exactly one pair of conversions: `TryFrom<Model>` for
//! reads (closed enums are re-validated, never trusted) and `From<&Domain>`
//! for the persisted shape. Writes go through `into_active_model`, which sets
//! every column explicitly so a full update never leaves stale values behind.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};

use crate::entity::{economic_indicators, user_settings, users, volatility_data};
use crate::error::MappingError;
use crate::models::{
    Indicator, NewIndicator, NewUser, NewVolatilitySample, User, UserSetting, VolatilitySample,
};

impl TryFrom<economic_indicators::Model> for Indicator {
    type Error = MappingError;

    fn try_from(model: economic_indicators::Model) -> Result<Self, Self::Error> {
        Ok(Indicator {
            id: model.id,
            released_at: model.released_at,
            country: model.country,
            name: model.name,
            actual: model.actual,
            forecast: model.forecast,
            previous: model.previous,
            impact: model.impact.parse()?,
            source: model.source,
            unit: model.unit,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Indicator> for economic_indicators::Model {
    fn from(indicator: &Indicator) -> Self {
        economic_indicators::Model {
            id: indicator.id,
            released_at: indicator.released_at,
            country: indicator.country.clone(),
            name: indicator.name.clone(),
            actual: indicator.actual,
            forecast: indicator.forecast,
            previous: indicator.previous,
            impact: indicator.impact.as_str().to_string(),
            source: indicator.source.clone(),
            unit: indicator.unit.clone(),
            created_at: indicator.created_at,
            updated_at: indicator.updated_at,
        }
    }
}

impl NewIndicator {
    /// Active model for an insert (`id` is `None`) or a full update of `id`.
    pub fn into_active_model(self, id: Option<i64>, now: DateTime<Utc>) -> economic_indicators::ActiveModel {
        economic_indicators::ActiveModel {
            id: id.map_or(NotSet, Unchanged),
            released_at: Set(self.released_at),
            country: Set(self.country),
            name: Set(self.name),
            actual: Set(self.actual),
            forecast: Set(self.forecast),
            previous: Set(self.previous),
            impact: Set(self.impact.as_str().to_string()),
            source: Set(self.source),
            unit: Set(self.unit),
            created_at: if id.is_some() { NotSet } else { Set(now) },
            updated_at: Set(now),
        }
    }
}

impl From<volatility_data::Model> for VolatilitySample {
    fn from(model: volatility_data::Model) -> Self {
        VolatilitySample {
            id: model.id,
            indicator_id: model.indicator_id,
            timeframe: model.timeframe,
            period_start: model.period_start,
            period_end: model.period_end,
            high_price: model.high_price,
            low_price: model.low_price,
            volatility: model.volatility,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&VolatilitySample> for volatility_data::Model {
    fn from(sample: &VolatilitySample) -> Self {
        volatility_data::Model {
            id: sample.id,
            indicator_id: sample.indicator_id,
            timeframe: sample.timeframe.clone(),
            period_start: sample.period_start,
            period_end: sample.period_end,
            high_price: sample.high_price,
            low_price: sample.low_price,
            volatility: sample.volatility,
            created_at: sample.created_at,
            updated_at: sample.updated_at,
        }
    }
}

impl NewVolatilitySample {
    pub fn into_active_model(self, id: Option<i64>, now: DateTime<Utc>) -> volatility_data::ActiveModel {
        volatility_data::ActiveModel {
            id: id.map_or(NotSet, Unchanged),
            indicator_id: Set(self.indicator_id),
            timeframe: Set(self.timeframe),
            period_start: Set(self.period_start),
            period_end: Set(self.period_end),
            high_price: Set(self.high_price),
            low_price: Set(self.low_price),
            volatility: Set(self.volatility),
            created_at: if id.is_some() { NotSet } else { Set(now) },
            updated_at: Set(now),
        }
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: model.id,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&User> for users::Model {
    fn from(user: &User) -> Self {
        users::Model {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl NewUser {
    pub fn into_active_model(self, id: Option<i64>, now: DateTime<Utc>) -> users::ActiveModel {
        users::ActiveModel {
            id: id.map_or(NotSet, Unchanged),
            username: Set(self.username),
            email: Set(self.email),
            password_hash: Set(self.password_hash),
            created_at: if id.is_some() { NotSet } else { Set(now) },
            updated_at: Set(now),
        }
    }
}

impl From<user_settings::Model> for UserSetting {
    fn from(model: user_settings::Model) -> Self {
        UserSetting {
            id: model.id,
            user_id: model.user_id,
            key: model.setting_key,
            value: model.setting_value,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&UserSetting> for user_settings::Model {
    fn from(setting: &UserSetting) -> Self {
        user_settings::Model {
            id: setting.id,
            user_id: setting.user_id,
            setting_key: setting.key.clone(),
            setting_value: setting.value.clone(),
            created_at: setting.created_at,
            updated_at: setting.updated_at,
        }
    }
}

/// Insert model for one entry of a user's key-value settings.
pub fn new_setting_active_model(
    user_id: i64,
    key: String,
    value: String,
    now: DateTime<Utc>,
) -> user_settings::ActiveModel {
    user_settings::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        setting_key: Set(key),
        setting_value: Set(value),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Impact;
    use chrono::TimeZone;

    fn sample_time(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 8, hour, 30, 0).unwrap()
    }

    fn sample_indicator() -> Indicator {
        Indicator {
            id: 42,
            released_at: sample_time(13),
            country: "US".to_string(),
            name: "Non-Farm Employment Change".to_string(),
            actual: Some(275.0),
            forecast: None,
            previous: Some(229.0),
            impact: Impact::High,
            source: Some("Bureau of Labor Statistics".to_string()),
            unit: None,
            created_at: sample_time(14),
            updated_at: sample_time(15),
        }
    }

    #[test]
    fn test_indicator_round_trip_preserves_every_field() {
        let indicator = sample_indicator();
        let model = economic_indicators::Model::from(&indicator);
        assert_eq!(model.impact, "HIGH");
        assert_eq!(model.forecast, None);
        assert_eq!(model.unit, None);

        let restored = Indicator::try_from(model).unwrap();
        assert_eq!(restored, indicator);
    }

    #[test]
    fn test_indicator_with_unknown_stored_impact_fails() {
        let mut model = economic_indicators::Model::from(&sample_indicator());
        model.impact = "SEVERE".to_string();

        let err = Indicator::try_from(model).unwrap_err();
        assert_eq!(err, MappingError::UnknownImpact("SEVERE".to_string()));
    }

    #[test]
    fn test_volatility_round_trip() {
        let sample = VolatilitySample {
            id: 7,
            indicator_id: 42,
            timeframe: "15m".to_string(),
            period_start: sample_time(13),
            period_end: sample_time(14),
            high_price: 151.234,
            low_price: 150.871,
            volatility: 151.234 - 150.871,
            created_at: sample_time(15),
            updated_at: sample_time(16),
        };
        let restored = VolatilitySample::from(volatility_data::Model::from(&sample));
        assert_eq!(restored, sample);
    }

    #[test]
    fn test_user_and_setting_round_trip() {
        let user = User {
            id: 3,
            username: "analyst".to_string(),
            email: "analyst@example.com".to_string(),
            password_hash: "pbkdf2_sha256$1000$00$11".to_string(),
            created_at: sample_time(9),
            updated_at: sample_time(10),
        };
        assert_eq!(User::from(users::Model::from(&user)), user);

        let setting = UserSetting {
            id: 11,
            user_id: 3,
            key: "theme".to_string(),
            value: "dark".to_string(),
            created_at: sample_time(9),
            updated_at: sample_time(9),
        };
        let model = user_settings::Model::from(&setting);
        assert_eq!(model.setting_key, "theme");
        assert_eq!(UserSetting::from(model), setting);
    }

    #[test]
    fn test_new_indicator_active_model_for_insert_and_update() {
        let new = NewIndicator {
            released_at: sample_time(13),
            country: "JP".to_string(),
            name: "BoJ Policy Rate".to_string(),
            actual: None,
            forecast: Some(-0.1),
            previous: Some(-0.1),
            impact: Impact::Medium,
            source: None,
            unit: Some("%".to_string()),
        };
        let now = sample_time(20);

        let insert = new.clone().into_active_model(None, now);
        assert_eq!(insert.id, NotSet);
        assert_eq!(insert.created_at, Set(now));
        assert_eq!(insert.actual, Set(None));
        assert_eq!(insert.impact, Set("MEDIUM".to_string()));

        let update = new.into_active_model(Some(5), now);
        assert_eq!(update.id, Unchanged(5));
        assert_eq!(update.created_at, NotSet);
        assert_eq!(update.updated_at, Set(now));
    }
}
