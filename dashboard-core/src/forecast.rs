//! Per-day bucketing of forecast readings.

use std::collections::HashMap;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::model::ForecastReading;

/// India Standard Time, the dashboard's display zone unless configured otherwise.
pub const DEFAULT_OFFSET_MINUTES: i32 = 5 * 60 + 30;

/// Readings that fall on one calendar day of the display zone.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub temp_sum: f64,
    pub humidity_sum: f64,
    pub count: usize,
    /// First description reported for the day.
    pub description: Option<String>,
}

impl DailyBucket {
    fn new(date: NaiveDate, reading: &ForecastReading) -> Self {
        Self {
            date,
            temp_sum: reading.temperature,
            humidity_sum: reading.humidity,
            count: 1,
            description: reading.description.clone(),
        }
    }

    fn add(&mut self, reading: &ForecastReading) {
        self.temp_sum += reading.temperature;
        self.humidity_sum += reading.humidity;
        self.count += 1;
        if self.description.is_none() {
            self.description = reading.description.clone();
        }
    }

    pub fn average_temperature(&self) -> f64 {
        self.temp_sum / self.count as f64
    }

    pub fn average_humidity(&self) -> f64 {
        self.humidity_sum / self.count as f64
    }

    /// Average temperature as shown on the chart.
    pub fn display_temperature(&self) -> i64 {
        round_half_up(self.average_temperature())
    }

    /// e.g. `16 Oct 2026`
    pub fn label(&self) -> String {
        self.date.format("%-d %b %Y").to_string()
    }

    /// e.g. `Fri, 16 Oct`
    pub fn tick_label(&self) -> String {
        self.date.format("%a, %-d %b").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastAggregator {
    offset: FixedOffset,
}

impl Default for ForecastAggregator {
    fn default() -> Self {
        Self::from_offset_minutes(DEFAULT_OFFSET_MINUTES).unwrap_or_else(|| Self::new(Utc.fix()))
    }
}

impl ForecastAggregator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// `None` when the offset is a day or more away from UTC.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes.checked_mul(60).and_then(FixedOffset::east_opt).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Short name of the display zone for chart titles.
    pub fn zone_label(&self) -> String {
        if self.offset.local_minus_utc() == DEFAULT_OFFSET_MINUTES * 60 {
            "IST".to_string()
        } else {
            format!("UTC{}", self.offset)
        }
    }

    /// Buckets `readings` by local calendar day, keeping the order in which
    /// each day first appears. Partial days are kept as they are.
    pub fn aggregate(&self, readings: &[ForecastReading]) -> Vec<DailyBucket> {
        let mut buckets: Vec<DailyBucket> = Vec::new();
        let mut index: HashMap<NaiveDate, usize> = HashMap::new();

        for reading in readings {
            let date = reading.timestamp.with_timezone(&self.offset).date_naive();

            match index.get(&date) {
                Some(&i) => buckets[i].add(reading),
                None => {
                    index.insert(date, buckets.len());
                    buckets.push(DailyBucket::new(date, reading));
                }
            }
        }

        buckets
    }
}

/// Halves round towards positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(y: i32, m: u32, d: u32, h: u32, temp: f64, humidity: f64) -> ForecastReading {
        ForecastReading {
            timestamp: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            temperature: temp,
            humidity,
            description: None,
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(ForecastAggregator::default().aggregate(&[]).is_empty());
    }

    #[test]
    fn single_day_averages_all_readings() {
        let readings = vec![
            reading(2026, 10, 16, 0, 18.0, 60.0),
            reading(2026, 10, 16, 3, 21.0, 50.0),
            reading(2026, 10, 16, 6, 27.0, 40.0),
        ];

        let buckets = ForecastAggregator::default().aggregate(&readings);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 3);
        assert_eq!(buckets[0].average_temperature(), 22.0);
        assert_eq!(buckets[0].average_humidity(), 50.0);
    }

    #[test]
    fn two_days_in_display_zone() {
        let readings = vec![
            reading(2026, 10, 16, 9, 20.0, 40.0),
            reading(2026, 10, 16, 15, 30.0, 60.0),
            reading(2026, 10, 17, 9, 10.0, 80.0),
        ];

        let buckets = ForecastAggregator::default().aggregate(&readings);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].date, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(buckets[0].display_temperature(), 25);
        assert_eq!(buckets[0].average_humidity(), 50.0);
        assert_eq!(buckets[1].display_temperature(), 10);
        assert_eq!(buckets[1].count, 1);
    }

    #[test]
    fn late_utc_readings_roll_into_next_local_day() {
        // 19:00 UTC is 00:30 the next day at +05:30.
        let readings = vec![
            reading(2026, 10, 16, 18, 20.0, 40.0),
            reading(2026, 10, 16, 19, 30.0, 40.0),
        ];

        let buckets = ForecastAggregator::default().aggregate(&readings);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[1].date, NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let readings = vec![
            reading(2026, 10, 18, 6, 20.0, 40.0),
            reading(2026, 10, 16, 6, 30.0, 40.0),
            reading(2026, 10, 18, 9, 22.0, 40.0),
        ];

        let dates: Vec<_> =
            ForecastAggregator::default().aggregate(&readings).iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
                NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            ]
        );
    }

    #[test]
    fn first_description_of_the_day_is_kept() {
        let first = reading(2026, 10, 16, 6, 20.0, 40.0);
        let mut second = reading(2026, 10, 16, 9, 22.0, 40.0);
        let mut third = reading(2026, 10, 16, 12, 24.0, 40.0);
        second.description = Some("light rain".into());
        third.description = Some("clear sky".into());

        let buckets = ForecastAggregator::default().aggregate(&[first, second, third]);
        assert_eq!(buckets[0].description.as_deref(), Some("light rain"));
    }

    #[test]
    fn utc_aggregator_keeps_calendar_days() {
        let agg = ForecastAggregator::from_offset_minutes(0).unwrap();
        let readings = vec![reading(2026, 10, 16, 23, 20.0, 40.0)];
        let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(agg.aggregate(&readings)[0].date, day);
        assert_eq!(agg.zone_label(), "UTC+00:00");
    }

    #[test]
    fn labels_and_rounding() {
        let bucket = DailyBucket {
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            temp_sum: 45.0,
            humidity_sum: 100.0,
            count: 2,
            description: None,
        };
        assert_eq!(bucket.display_temperature(), 23);
        assert_eq!(bucket.label(), "16 Oct 2026");
        assert_eq!(bucket.tick_label(), "Fri, 16 Oct");
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(ForecastAggregator::default().zone_label(), "IST");
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        assert!(ForecastAggregator::from_offset_minutes(24 * 60).is_none());
        assert!(ForecastAggregator::from_offset_minutes(-24 * 60).is_none());
    }

    #[test]
    fn huge_offset_is_rejected_not_wrapped() {
        assert!(ForecastAggregator::from_offset_minutes(100_000_000).is_none());
        assert!(ForecastAggregator::from_offset_minutes(i32::MIN).is_none());
    }
}
