//! Deciding whether an umbrella is needed from an hourly forecast.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

use crate::model::HourlyForecast;

const PRECIPITATION_KEYWORDS: [&str; 3] = ["rain", "snow", "hail"];
const PERIOD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// True when the condition label mentions rain, snow or hail.
///
/// Substring match on the lowercased label, so "Rain" and "Freezing rain"
/// match while "Thunderstorm" and "Drizzle" do not.
pub fn is_precipitating(label: &str) -> bool {
    let label = label.to_lowercase();
    PRECIPITATION_KEYWORDS.iter().any(|kw| label.contains(kw))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodSpan {
    /// Precipitation in the current sample.
    Now,
    /// A forecast hour inside the window.
    Hour {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecipitationPeriod {
    pub span: PeriodSpan,
    /// Lowercased condition label, e.g. "rain".
    pub condition: String,
}

impl PrecipitationPeriod {
    pub fn render(&self) -> String {
        match &self.span {
            PeriodSpan::Now => {
                format!("It is currently {}ing or about to rain.", self.condition)
            }
            PeriodSpan::Hour { start, end } => format!(
                "It will {} from {} to {}.",
                self.condition,
                start.format(PERIOD_TIME_FORMAT),
                end.format(PERIOD_TIME_FORMAT),
            ),
        }
    }
}

/// Outcome of a single umbrella check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UmbrellaVerdict {
    periods: Vec<PrecipitationPeriod>,
    current_description: Option<String>,
}

impl UmbrellaVerdict {
    pub fn needed(&self) -> bool {
        !self.periods.is_empty()
    }

    pub fn periods(&self) -> &[PrecipitationPeriod] {
        &self.periods
    }

    pub fn current_description(&self) -> Option<&str> {
        self.current_description.as_deref()
    }

    /// Console lines for this verdict, headline first.
    pub fn render_lines(&self) -> Vec<String> {
        if self.needed() {
            std::iter::once("Yes, bring an umbrella.".to_string())
                .chain(self.periods.iter().map(PrecipitationPeriod::render))
                .collect()
        } else {
            vec![
                "You don't need an umbrella.".to_string(),
                format!(
                    "Current weather: {}",
                    self.current_description().unwrap_or("unknown")
                ),
            ]
        }
    }
}

/// Scan `forecast` for precipitation between `now` and `end` (inclusive).
///
/// Every precipitating sample inside the window yields an hour-long period,
/// in forecast order. The first sample is also checked on its own and, when
/// precipitating, appends a [`PeriodSpan::Now`] period even if the same hour
/// already matched inside the window.
///
/// Period times are rendered in `now`'s time zone.
pub fn decide<Tz: TimeZone>(
    now: &DateTime<Tz>,
    end: &DateTime<Tz>,
    forecast: &HourlyForecast,
) -> UmbrellaVerdict {
    let tz = now.timezone();
    let window_start = now.with_timezone(&Utc);
    let window_end = end.with_timezone(&Utc);

    let mut periods: Vec<PrecipitationPeriod> = forecast
        .samples()
        .iter()
        .filter(|s| window_start <= s.time && s.time <= window_end)
        .filter(|s| is_precipitating(&s.condition))
        .map(|s| {
            let start = s.time.with_timezone(&tz).fixed_offset();
            PrecipitationPeriod {
                span: PeriodSpan::Hour {
                    start,
                    end: start + Duration::hours(1),
                },
                condition: s.condition.to_lowercase(),
            }
        })
        .collect();

    let current = forecast.current();
    if let Some(sample) = current.filter(|s| is_precipitating(&s.condition)) {
        periods.push(PrecipitationPeriod {
            span: PeriodSpan::Now,
            condition: sample.condition.to_lowercase(),
        });
    }

    tracing::debug!(
        samples = forecast.len(),
        matches = periods.len(),
        "scanned forecast window"
    );

    UmbrellaVerdict {
        periods,
        current_description: current.map(|s| s.description.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HourlySample;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 23, hour, 0, 0).unwrap()
    }

    fn sample(time: DateTime<Utc>, condition: &str, description: &str) -> HourlySample {
        HourlySample {
            time,
            condition: condition.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn classifies_by_keyword_substring() {
        for label in ["Rain", "rain", "Snow", "HAIL", "Freezing rain", "Rain and snow"] {
            assert!(is_precipitating(label), "{label}");
        }
        for label in ["Clear", "Clouds", "Thunderstorm", "Drizzle", "Mist", ""] {
            assert!(!is_precipitating(label), "{label}");
        }
    }

    #[test]
    fn classification_is_stable() {
        for label in ["Rain", "Clouds", "Snow"] {
            assert_eq!(is_precipitating(label), is_precipitating(label));
        }
    }

    #[test]
    fn clear_forecast_needs_no_umbrella() {
        let forecast = HourlyForecast::new(vec![sample(t(14), "Clear", "clear sky")]);
        let verdict = decide(&t(14), &t(21), &forecast);

        assert!(!verdict.needed());
        assert!(verdict.periods().is_empty());
        assert_eq!(
            verdict.render_lines(),
            vec!["You don't need an umbrella.", "Current weather: clear sky"]
        );
    }

    #[test]
    fn rain_now_is_reported_twice() {
        let forecast = HourlyForecast::new(vec![
            sample(t(14), "Rain", "light rain"),
            sample(t(15), "Clouds", "broken clouds"),
        ]);
        let verdict = decide(&t(14), &t(21), &forecast);

        assert!(verdict.needed());
        assert_eq!(verdict.periods().len(), 2);

        let start = t(14).fixed_offset();
        assert_eq!(
            verdict.periods()[0],
            PrecipitationPeriod {
                span: PeriodSpan::Hour {
                    start,
                    end: start + Duration::hours(1),
                },
                condition: "rain".into(),
            }
        );
        assert_eq!(verdict.periods()[1].span, PeriodSpan::Now);

        assert_eq!(
            verdict.render_lines(),
            vec![
                "Yes, bring an umbrella.",
                "It will rain from 2024-06-23 14:00 to 2024-06-23 15:00.",
                "It is currently raining or about to rain.",
            ]
        );
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let forecast = HourlyForecast::new(vec![
            sample(t(13), "Clouds", "overcast"),
            sample(t(14), "Snow", "light snow"),
            sample(t(18), "Rain", "moderate rain"),
            sample(t(19), "Rain", "heavy rain"),
        ]);
        let verdict = decide(&t(14), &t(18), &forecast);

        let starts: Vec<_> = verdict
            .periods()
            .iter()
            .map(|p| match &p.span {
                PeriodSpan::Hour { start, .. } => start.with_timezone(&Utc),
                PeriodSpan::Now => panic!("current sample is not precipitating"),
            })
            .collect();
        assert_eq!(starts, vec![t(14), t(18)]);
    }

    #[test]
    fn current_sample_checked_outside_window() {
        // First sample is an hour before "now", so only the current check fires.
        let forecast = HourlyForecast::new(vec![
            sample(t(13), "Snow", "snow"),
            sample(t(14), "Clear", "clear sky"),
        ]);
        let verdict = decide(&t(14), &t(16), &forecast);

        assert_eq!(verdict.periods().len(), 1);
        assert_eq!(
            verdict.render_lines()[1],
            "It is currently snowing or about to rain."
        );
    }

    #[test]
    fn periods_keep_forecast_order() {
        let forecast = HourlyForecast::new(vec![
            sample(t(14), "Clouds", "few clouds"),
            sample(t(16), "Rain", "light rain"),
            sample(t(15), "Snow", "light snow"),
        ]);
        let first = decide(&t(14), &t(20), &forecast);
        let second = decide(&t(14), &t(20), &forecast);

        assert_eq!(first, second);
        let conditions: Vec<_> = first.periods().iter().map(|p| p.condition.as_str()).collect();
        assert_eq!(conditions, vec!["rain", "snow"]);
    }

    #[test]
    fn renders_times_in_callers_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = t(14).with_timezone(&tz);
        let end = t(20).with_timezone(&tz);
        let forecast = HourlyForecast::new(vec![
            sample(t(14), "Clouds", "few clouds"),
            sample(t(15), "Rain", "light rain"),
        ]);

        let lines = decide(&now, &end, &forecast).render_lines();
        assert_eq!(lines[1], "It will rain from 2024-06-23 17:00 to 2024-06-23 18:00.");
    }

    #[test]
    fn empty_forecast_needs_no_umbrella() {
        let verdict = decide(&t(14), &t(21), &HourlyForecast::default());
        assert!(!verdict.needed());
        assert_eq!(verdict.render_lines()[1], "Current weather: unknown");
    }
}
