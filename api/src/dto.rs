//! Request and response shapes plus the boundary validation that turns
//! requests into domain values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::statistics::{
    BucketSummary, Classification, Summary, Surprise, SurpriseDirection, ThresholdMethod, Thresholds,
};
use shared::{
    Impact, IndicatorFilter, Indicator, NewIndicator, NewVolatilitySample, StatisticsSettings, User,
    VolatilityCategory, VolatilitySample,
};
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult, FieldError};
use crate::services::statistics_service::{IndicatorStatistics, VolatilityRanking};

const MAX_COUNTRY_LEN: usize = 16;
const MAX_NAME_LEN: usize = 255;
const MAX_UNIT_LEN: usize = 32;
const MAX_TIMEFRAME_LEN: usize = 16;
const MAX_SETTING_KEY_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 8;

/// Collects field errors so a request reports every problem at once.
#[derive(Debug, Default)]
struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    fn require(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
    }

    fn text(&mut self, field: &str, value: &str, max_len: usize) {
        let trimmed = value.trim();
        self.require(!trimmed.is_empty(), field, "must not be empty");
        self.require(
            trimmed.chars().count() <= max_len,
            field,
            format!("must be at most {} characters", max_len),
        );
    }

    fn optional_number(&mut self, field: &str, value: Option<f64>) {
        if let Some(v) = value {
            self.require(v.is_finite(), field, "must be a finite number");
        }
    }

    fn price(&mut self, field: &str, value: f64) {
        self.require(
            value.is_finite() && value >= 0.0,
            field,
            "must be a finite non-negative number",
        );
    }

    fn finish<T>(self, value: T) -> AppResult<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Blank optional text is treated as absent, never stored as "".
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_impact(checks: &mut Checks, field: &str, raw: &str) -> Impact {
    match raw.parse::<Impact>() {
        Ok(impact) => impact,
        Err(e) => {
            checks.require(false, field, e.to_string());
            Impact::Medium
        }
    }
}

// ==============================================================================
// Indicators
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorRequest {
    pub released_at: DateTime<Utc>,
    pub country: String,
    pub name: String,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub previous: Option<f64>,
    pub impact: String,
    pub source: Option<String>,
    pub unit: Option<String>,
    /// Initial samples, only honoured on create.
    #[serde(default)]
    pub volatilities: Vec<VolatilityRequest>,
}

impl IndicatorRequest {
    /// Validates the indicator and any nested samples. Nested samples carry
    /// `indicator_id = 0` until the indicator is inserted.
    pub fn validate(self) -> AppResult<(NewIndicator, Vec<NewVolatilitySample>)> {
        let mut checks = Checks::default();
        checks.text("country", &self.country, MAX_COUNTRY_LEN);
        checks.text("name", &self.name, MAX_NAME_LEN);
        checks.optional_number("actual", self.actual);
        checks.optional_number("forecast", self.forecast);
        checks.optional_number("previous", self.previous);
        let impact = parse_impact(&mut checks, "impact", &self.impact);

        let source = optional_text(self.source);
        let unit = optional_text(self.unit);
        if let Some(source) = &source {
            checks.text("source", source, MAX_NAME_LEN);
        }
        if let Some(unit) = &unit {
            checks.text("unit", unit, MAX_UNIT_LEN);
        }

        let samples: Vec<NewVolatilitySample> = self
            .volatilities
            .into_iter()
            .enumerate()
            .map(|(i, sample)| sample.check(&mut checks, &format!("volatilities[{}].", i), 0))
            .collect();

        let indicator = NewIndicator {
            released_at: self.released_at,
            country: self.country.trim().to_string(),
            name: self.name.trim().to_string(),
            actual: self.actual,
            forecast: self.forecast,
            previous: self.previous,
            impact,
            source,
            unit,
        };
        checks.finish((indicator, samples))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndicatorQuery {
    pub country: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub impact: Option<String>,
}

impl IndicatorQuery {
    pub fn into_filter(self) -> AppResult<IndicatorFilter> {
        build_filter(self.country, self.from, self.to, self.impact)
    }
}

fn build_filter(
    country: Option<String>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    impact: Option<String>,
) -> AppResult<IndicatorFilter> {
    let mut checks = Checks::default();
    if let (Some(from), Some(to)) = (from, to) {
        checks.require(from <= to, "from", "must not be after `to`");
    }
    let impact = impact.map(|raw| parse_impact(&mut checks, "impact", &raw));
    checks.finish(IndicatorFilter {
        country: optional_text(country),
        from,
        to,
        impact,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorResponse {
    pub id: i64,
    pub released_at: DateTime<Utc>,
    pub country: String,
    pub name: String,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub previous: Option<f64>,
    pub impact: Impact,
    pub source: Option<String>,
    pub unit: Option<String>,
    pub surprise: Surprise,
    pub surprise_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Indicator> for IndicatorResponse {
    fn from(indicator: Indicator) -> Self {
        let surprise = indicator.surprise();
        IndicatorResponse {
            id: indicator.id,
            released_at: indicator.released_at,
            country: indicator.country,
            name: indicator.name,
            actual: indicator.actual,
            forecast: indicator.forecast,
            previous: indicator.previous,
            impact: indicator.impact,
            source: indicator.source,
            unit: indicator.unit,
            surprise,
            surprise_available: surprise.is_available(),
            created_at: indicator.created_at,
            updated_at: indicator.updated_at,
        }
    }
}

/// An indicator together with its samples.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorDetailResponse {
    #[serde(flatten)]
    pub indicator: IndicatorResponse,
    pub volatilities: Vec<VolatilityResponse>,
}

impl From<(Indicator, Vec<VolatilitySample>)> for IndicatorDetailResponse {
    fn from((indicator, samples): (Indicator, Vec<VolatilitySample>)) -> Self {
        IndicatorDetailResponse {
            indicator: indicator.into(),
            volatilities: samples.into_iter().map(Into::into).collect(),
        }
    }
}

// ==============================================================================
// Volatility samples
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct VolatilityRequest {
    /// Required for standalone writes, ignored when nested in an indicator.
    pub indicator_id: Option<i64>,
    pub timeframe: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub high_price: f64,
    pub low_price: f64,
    /// Defaults to `high_price - low_price`.
    pub volatility: Option<f64>,
}

impl VolatilityRequest {
    pub fn validate(self) -> AppResult<NewVolatilitySample> {
        let mut checks = Checks::default();
        checks.require(self.indicator_id.is_some(), "indicator_id", "is required");
        let indicator_id = self.indicator_id.unwrap_or_default();
        let sample = self.check(&mut checks, "", indicator_id);
        checks.finish(sample)
    }

    fn check(self, checks: &mut Checks, prefix: &str, indicator_id: i64) -> NewVolatilitySample {
        let field = |name: &str| format!("{}{}", prefix, name);

        checks.text(&field("timeframe"), &self.timeframe, MAX_TIMEFRAME_LEN);
        checks.require(
            self.period_end >= self.period_start,
            field("period_end"),
            "must not be before period_start",
        );
        checks.price(&field("high_price"), self.high_price);
        checks.price(&field("low_price"), self.low_price);
        checks.require(
            self.high_price >= self.low_price,
            field("high_price"),
            "must not be below low_price",
        );
        if let Some(volatility) = self.volatility {
            checks.price(&field("volatility"), volatility);
        }

        NewVolatilitySample {
            indicator_id,
            timeframe: self.timeframe.trim().to_string(),
            period_start: self.period_start,
            period_end: self.period_end,
            high_price: self.high_price,
            low_price: self.low_price,
            volatility: self
                .volatility
                .unwrap_or_else(|| NewVolatilitySample::price_range(self.high_price, self.low_price)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VolatilityResponse {
    pub id: i64,
    pub indicator_id: i64,
    pub timeframe: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub high_price: f64,
    pub low_price: f64,
    pub volatility: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VolatilitySample> for VolatilityResponse {
    fn from(sample: VolatilitySample) -> Self {
        VolatilityResponse {
            id: sample.id,
            indicator_id: sample.indicator_id,
            timeframe: sample.timeframe,
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

// ==============================================================================
// Statistics
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticsQuery {
    pub method: Option<String>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub min_samples: Option<usize>,
    pub country: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub impact: Option<String>,
}

impl StatisticsQuery {
    pub fn method(&self, settings: &StatisticsSettings) -> AppResult<ThresholdMethod> {
        match self.method.as_deref().map(str::trim) {
            None | Some("percentile") => Ok(ThresholdMethod::Percentile),
            Some("absolute") => {
                let low = self.low.unwrap_or(settings.absolute_low);
                let high = self.high.unwrap_or(settings.absolute_high);
                Thresholds::absolute(low, high).map_err(|e| AppError::invalid("low", e.to_string()))?;
                Ok(ThresholdMethod::Absolute { low, high })
            }
            Some(other) => Err(AppError::invalid(
                "method",
                format!("unknown method `{}` (expected percentile or absolute)", other),
            )),
        }
    }

    pub fn min_samples(&self, settings: &StatisticsSettings) -> usize {
        self.min_samples.unwrap_or(settings.min_samples).max(1)
    }

    pub fn filter(&self) -> AppResult<IndicatorFilter> {
        build_filter(
            self.country.clone(),
            self.from,
            self.to,
            self.impact.clone(),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationView {
    #[serde(flatten)]
    pub method: ThresholdMethod,
    pub thresholds: Thresholds,
    pub degenerate: bool,
    pub buckets: Vec<BucketSummary>,
}

impl From<&Classification> for ClassificationView {
    fn from(classification: &Classification) -> Self {
        ClassificationView {
            method: classification.method,
            thresholds: classification.thresholds,
            degenerate: classification.degenerate,
            buckets: classification.bucket_summaries(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedSampleView {
    pub sample_id: i64,
    pub timeframe: String,
    pub volatility: f64,
    pub category: VolatilityCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorStatisticsResponse {
    pub indicator_id: i64,
    pub name: String,
    pub country: String,
    pub released_at: DateTime<Utc>,
    pub impact: Impact,
    pub high_impact: bool,
    pub surprise: Surprise,
    pub surprise_available: bool,
    pub surprise_direction: SurpriseDirection,
    pub surprise_percent: Option<f64>,
    pub summary: Summary,
    pub classification: ClassificationView,
    pub samples: Vec<ClassifiedSampleView>,
}

impl From<IndicatorStatistics> for IndicatorStatisticsResponse {
    fn from(stats: IndicatorStatistics) -> Self {
        let IndicatorStatistics {
            indicator,
            samples,
            classification,
            summary,
        } = stats;
        let surprise = indicator.surprise();

        let samples = samples
            .into_iter()
            .zip(classification.values.iter())
            .map(|(sample, classified)| ClassifiedSampleView {
                sample_id: sample.id,
                timeframe: sample.timeframe,
                volatility: sample.volatility,
                category: classified.category,
            })
            .collect();

        IndicatorStatisticsResponse {
            indicator_id: indicator.id,
            high_impact: indicator.impact.is_high(),
            surprise,
            surprise_available: surprise.is_available(),
            surprise_direction: surprise.direction(),
            surprise_percent: shared::statistics::surprise_percent(indicator.actual, indicator.forecast),
            impact: indicator.impact,
            released_at: indicator.released_at,
            country: indicator.country,
            name: indicator.name,
            summary,
            classification: ClassificationView::from(&classification),
            samples,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventVolatilityView {
    pub country: String,
    pub name: String,
    pub releases: usize,
    pub sample_count: usize,
    pub mean_volatility: f64,
    pub category: VolatilityCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolatilityRankingResponse {
    pub min_samples: usize,
    pub classification: ClassificationView,
    pub events: Vec<EventVolatilityView>,
}

impl From<VolatilityRanking> for VolatilityRankingResponse {
    fn from(ranking: VolatilityRanking) -> Self {
        let mut events: Vec<EventVolatilityView> = ranking
            .events
            .into_iter()
            .zip(ranking.classification.values.iter())
            .map(|(event, classified)| EventVolatilityView {
                country: event.country,
                name: event.name,
                releases: event.releases,
                sample_count: event.sample_count,
                mean_volatility: event.mean_volatility,
                category: classified.category,
            })
            .collect();
        events.sort_by(|a, b| b.mean_volatility.total_cmp(&a.mean_volatility));

        VolatilityRankingResponse {
            min_samples: ranking.min_samples,
            classification: ClassificationView::from(&ranking.classification),
            events,
        }
    }
}

// ==============================================================================
// Users
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct UserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Validated user input; the password is still in clear text here.
#[derive(Debug, Clone)]
pub struct UserInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl UserRequest {
    pub fn validate(self) -> AppResult<UserInput> {
        let mut checks = Checks::default();
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_ascii_lowercase();

        checks.require(
            (3..=64).contains(&username.chars().count()),
            "username",
            "must be between 3 and 64 characters",
        );
        checks.require(
            username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'),
            "username",
            "may only contain letters, digits, '.', '_' and '-'",
        );
        let valid_email = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
            }
            None => false,
        };
        checks.require(valid_email && email.len() <= MAX_NAME_LEN, "email", "must be a valid email address");
        checks.require(
            self.password.chars().count() >= MIN_PASSWORD_LEN,
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        );

        checks.finish(UserInput {
            username,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsRequest {
    pub settings: BTreeMap<String, String>,
}

impl SettingsRequest {
    pub fn validate(self) -> AppResult<BTreeMap<String, String>> {
        let mut checks = Checks::default();
        let mut settings = BTreeMap::new();
        for (key, value) in self.settings {
            let field = format!("settings.{}", key);
            checks.text(&field, &key, MAX_SETTING_KEY_LEN);
            let trimmed = key.trim().to_string();
            checks.require(
                !settings.contains_key(&trimmed),
                field,
                "duplicate key after trimming",
            );
            settings.insert(trimmed, value);
        }
        checks.finish(settings)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub user_id: i64,
    pub settings: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 7, hour, 30, 0).unwrap()
    }

    fn indicator_request() -> IndicatorRequest {
        IndicatorRequest {
            released_at: at(12),
            country: " US ".to_string(),
            name: "Non-Farm Employment Change".to_string(),
            actual: Some(272.0),
            forecast: None,
            previous: Some(165.0),
            impact: "high".to_string(),
            source: Some("  ".to_string()),
            unit: Some("K".to_string()),
            volatilities: vec![],
        }
    }

    fn sample_request() -> VolatilityRequest {
        VolatilityRequest {
            indicator_id: Some(1),
            timeframe: "15m".to_string(),
            period_start: at(12),
            period_end: at(13),
            high_price: 156.8,
            low_price: 155.3,
            volatility: None,
        }
    }

    fn fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_indicator_without_forecast_is_valid() {
        let (indicator, samples) = indicator_request().validate().unwrap();
        assert_eq!(indicator.country, "US");
        assert_eq!(indicator.impact, Impact::High);
        assert_eq!(indicator.forecast, None);
        assert_eq!(indicator.source, None);
        assert_eq!(indicator.unit.as_deref(), Some("K"));
        assert!(samples.is_empty());
    }

    #[test]
    fn test_indicator_reports_every_bad_field() {
        let mut request = indicator_request();
        request.country = "".to_string();
        request.impact = "SEVERE".to_string();
        request.actual = Some(f64::NAN);
        let mut bad_sample = sample_request();
        bad_sample.low_price = 200.0;
        request.volatilities = vec![sample_request(), bad_sample];

        let fields = fields(request.validate().unwrap_err());
        assert!(fields.contains(&"country".to_string()));
        assert!(fields.contains(&"impact".to_string()));
        assert!(fields.contains(&"actual".to_string()));
        assert!(fields.contains(&"volatilities[1].high_price".to_string()));
        assert!(!fields.iter().any(|f| f.starts_with("volatilities[0]")));
    }

    #[test]
    fn test_sample_defaults_volatility_to_range() {
        let sample = sample_request().validate().unwrap();
        assert!((sample.volatility - 1.5).abs() < 1e-9);
        assert_eq!(sample.indicator_id, 1);
    }

    #[test]
    fn test_sample_rejects_inverted_period_and_missing_owner() {
        let mut request = sample_request();
        request.indicator_id = None;
        request.period_end = at(11);
        let fields = fields(request.validate().unwrap_err());
        assert_eq!(fields, vec!["indicator_id".to_string(), "period_end".to_string()]);
    }

    #[test]
    fn test_query_filter_validation() {
        let query = IndicatorQuery {
            impact: Some("LOW".to_string()),
            ..Default::default()
        };
        assert_eq!(query.into_filter().unwrap().impact, Some(Impact::Low));

        let query = IndicatorQuery {
            from: Some(at(14)),
            to: Some(at(10)),
            ..Default::default()
        };
        assert_eq!(fields(query.into_filter().unwrap_err()), vec!["from".to_string()]);
    }

    #[test]
    fn test_statistics_method_selection() {
        let settings = StatisticsSettings::default();
        let query = StatisticsQuery::default();
        assert_eq!(query.method(&settings).unwrap(), ThresholdMethod::Percentile);

        let query = StatisticsQuery {
            method: Some("absolute".to_string()),
            high: Some(0.002),
            ..Default::default()
        };
        assert_eq!(
            query.method(&settings).unwrap(),
            ThresholdMethod::Absolute { low: settings.absolute_low, high: 0.002 }
        );

        let query = StatisticsQuery {
            method: Some("absolute".to_string()),
            low: Some(0.5),
            high: Some(0.1),
            ..Default::default()
        };
        assert!(query.method(&settings).is_err());

        let query = StatisticsQuery {
            method: Some("zscore".to_string()),
            ..Default::default()
        };
        assert_eq!(fields(query.method(&settings).unwrap_err()), vec!["method".to_string()]);
    }

    #[test]
    fn test_user_validation() {
        let input = UserRequest {
            username: "fx_analyst".to_string(),
            email: "Analyst@Example.com".to_string(),
            password: "long enough".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(input.email, "analyst@example.com");

        let err = UserRequest {
            username: "x".to_string(),
            email: "nobody".to_string(),
            password: "short".to_string(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            fields(err),
            vec!["username".to_string(), "email".to_string(), "password".to_string()]
        );
    }

    #[test]
    fn test_settings_keys_colliding_after_trim_are_rejected() {
        let settings = BTreeMap::from([
            ("theme".to_string(), "dark".to_string()),
            (" theme".to_string(), "light".to_string()),
        ]);
        let err = SettingsRequest { settings }.validate().unwrap_err();
        assert_eq!(fields(err), vec!["settings.theme".to_string()]);

        let settings = BTreeMap::from([
            (" theme ".to_string(), "dark".to_string()),
            ("timezone".to_string(), "UTC".to_string()),
        ]);
        let trimmed = SettingsRequest { settings }.validate().unwrap();
        assert_eq!(trimmed.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(trimmed.len(), 2);
    }
}
