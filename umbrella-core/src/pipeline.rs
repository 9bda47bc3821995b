//! The full umbrella check: parse the end time, locate the city, fetch the
//! forecast, decide.

use chrono::{DateTime, FixedOffset, TimeZone};

use crate::{
    clock::resolve_end_time,
    decision::{UmbrellaVerdict, decide},
    error::UmbrellaError,
    model::GeoLocation,
    provider::ForecastProvider,
};

/// Everything the presentation layer needs after a successful check.
#[derive(Debug, Clone)]
pub struct UmbrellaReport {
    pub location: GeoLocation,
    pub end_time: DateTime<FixedOffset>,
    pub verdict: UmbrellaVerdict,
}

/// Run one check for `city`, from `now` until the time named by `phrase`.
///
/// The phrase is parsed before any request is made.
pub async fn check_umbrella<P, Tz>(
    provider: &P,
    city: &str,
    now: &DateTime<Tz>,
    phrase: &str,
) -> Result<UmbrellaReport, UmbrellaError>
where
    P: ForecastProvider + ?Sized,
    Tz: TimeZone,
{
    let end = resolve_end_time(now, phrase)?;

    let location = provider.geocode(city).await?;
    let forecast = provider.hourly_forecast(&location).await?;
    let verdict = decide(now, &end, &forecast);

    tracing::info!(
        city,
        needed = verdict.needed(),
        periods = verdict.periods().len(),
        "umbrella check complete"
    );

    Ok(UmbrellaReport {
        location,
        end_time: end.fixed_offset(),
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HourlyForecast, HourlySample};
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FakeProvider {
        samples: Vec<HourlySample>,
        missing_city: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ForecastProvider for FakeProvider {
        async fn geocode(&self, city: &str) -> Result<GeoLocation, UmbrellaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.missing_city {
                return Err(UmbrellaError::LocationNotFound {
                    city: city.to_string(),
                    status: Some(200),
                    body: "[]".into(),
                });
            }
            Ok(GeoLocation {
                name: city.to_string(),
                country: Some("US".into()),
                latitude: 40.71,
                longitude: -74.01,
            })
        }

        async fn hourly_forecast(&self, _location: &GeoLocation) -> Result<HourlyForecast, UmbrellaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HourlyForecast::new(self.samples.clone()))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 23, 14, 0, 0).unwrap()
    }

    fn sample(offset_hours: i64, condition: &str) -> HourlySample {
        HourlySample {
            time: now() + Duration::hours(offset_hours),
            condition: condition.to_string(),
            description: format!("{} today", condition.to_lowercase()),
        }
    }

    #[tokio::test]
    async fn invalid_phrase_makes_no_requests() {
        let provider = FakeProvider::default();
        let err = check_umbrella(&provider, "New York", &now(), "25:99")
            .await
            .unwrap_err();

        assert!(matches!(err, UmbrellaError::InvalidTimeFormat(ref p) if p == "25:99"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_city_stops_before_forecast() {
        let provider = FakeProvider {
            missing_city: true,
            ..Default::default()
        };
        let err = check_umbrella(&provider, "Atlantis", &now(), "9 PM")
            .await
            .unwrap_err();

        assert!(matches!(err, UmbrellaError::LocationNotFound { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clear_day_reports_description() {
        let provider = FakeProvider {
            samples: vec![sample(0, "Clear")],
            ..Default::default()
        };
        let report = check_umbrella(&provider, "New York", &now(), "9 PM")
            .await
            .unwrap();

        assert_eq!(report.end_time, (now() + Duration::hours(7)).fixed_offset());
        assert_eq!(report.location.display_name(), "New York, US");
        assert!(!report.verdict.needed());
        assert_eq!(report.verdict.current_description(), Some("clear today"));
    }

    #[tokio::test]
    async fn rain_until_evening_needs_umbrella() {
        let provider = FakeProvider {
            samples: vec![sample(0, "Rain"), sample(1, "Clouds"), sample(9, "Snow")],
            ..Default::default()
        };
        let report = check_umbrella(&provider, "New York", &now(), "9 PM")
            .await
            .unwrap();

        // Snow at 23:00 is past the end time.
        assert!(report.verdict.needed());
        assert_eq!(report.verdict.periods().len(), 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
