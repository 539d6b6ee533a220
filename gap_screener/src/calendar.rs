use chrono::{Days, NaiveDate};
use market_data_ingestor::providers::{ProviderError, TradingCalendar};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("only {found} trading days up to {to}, need {count}")]
    InsufficientHistory {
        to: NaiveDate,
        count: usize,
        found: usize,
    },
}

/// The `count` most recent trading days up to and including `to`, newest first.
///
/// Looks back twice as many calendar days as requested, which covers weekends and
/// holidays for any realistic window.
pub async fn previous_business_days(
    calendar: &dyn TradingCalendar,
    to: NaiveDate,
    count: usize,
) -> Result<Vec<NaiveDate>, CalendarError> {
    let span = Days::new(count as u64 * 2);
    let from = to.checked_sub_days(span).unwrap_or(NaiveDate::MIN);

    let mut days = calendar.trading_days(from, to).await?;
    days.retain(|day| *day <= to);
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();
    days.truncate(count);

    if days.len() < count {
        return Err(CalendarError::InsufficientHistory {
            to,
            count,
            found: days.len(),
        });
    }
    Ok(days)
}
