use crate::domain::model::BillingCycle;
use crate::domain::ports::BillingDateCalculator;
use chrono::{Datelike, Local, Months, NaiveDate};

/// 以固定的「今天」推算下次扣款日，讓同樣輸入永遠得到同樣結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarBillingCalculator {
    today: NaiveDate,
}

impl CalendarBillingCalculator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn from_local_clock() -> Self {
        Self::new(Local::now().date_naive())
    }

    // 永遠從原始開始日期加上 k 個週期，避免月底日期逐次縮短
    fn nth_period(start: NaiveDate, cycle: BillingCycle, k: u32) -> Option<NaiveDate> {
        start.checked_add_months(Months::new(cycle.months().checked_mul(k)?))
    }
}

impl BillingDateCalculator for CalendarBillingCalculator {
    /// 回傳第一個嚴格晚於今天的扣款日。
    /// 若推算超出 chrono 可表示的日期範圍，退回開始日期並記錄警告。
    fn next_billing_date(&self, start: NaiveDate, cycle: BillingCycle) -> NaiveDate {
        if start > self.today {
            return start;
        }

        let elapsed_months = (self.today.year() - start.year()) * 12
            + self.today.month() as i32
            - start.month() as i32;
        let mut k = (elapsed_months.max(0) as u32 / cycle.months()).saturating_sub(1);

        loop {
            match Self::nth_period(start, cycle, k) {
                Some(date) if date > self.today => return date,
                Some(_) => k += 1,
                None => {
                    tracing::warn!(
                        "⚠️ Billing date after {} overflows the calendar, keeping start date",
                        start
                    );
                    return start;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_future_start_is_next_billing_date() {
        let calc = CalendarBillingCalculator::new(date(2024, 3, 10));
        assert_eq!(
            calc.next_billing_date(date(2024, 4, 1), BillingCycle::Monthly),
            date(2024, 4, 1)
        );
    }

    #[test]
    fn test_monthly_rolls_past_today() {
        let calc = CalendarBillingCalculator::new(date(2024, 3, 10));
        assert_eq!(
            calc.next_billing_date(date(2023, 11, 15), BillingCycle::Monthly),
            date(2024, 3, 15)
        );
        // 與今天同日時要進到下一期
        assert_eq!(
            calc.next_billing_date(date(2024, 1, 10), BillingCycle::Monthly),
            date(2024, 4, 10)
        );
    }

    #[test]
    fn test_quarterly_and_yearly() {
        let calc = CalendarBillingCalculator::new(date(2024, 6, 1));
        assert_eq!(
            calc.next_billing_date(date(2024, 1, 20), BillingCycle::Quarterly),
            date(2024, 7, 20)
        );
        assert_eq!(
            calc.next_billing_date(date(2020, 2, 29), BillingCycle::Yearly),
            date(2025, 2, 28)
        );
    }

    #[test]
    fn test_month_end_does_not_drift() {
        let calc = CalendarBillingCalculator::new(date(2024, 3, 1));
        assert_eq!(
            calc.next_billing_date(date(2024, 1, 31), BillingCycle::Monthly),
            date(2024, 3, 31)
        );
    }

    #[test]
    fn test_calendar_overflow_keeps_start_date() {
        let calc = CalendarBillingCalculator::new(NaiveDate::MAX);
        let start = NaiveDate::MAX.pred_opt().unwrap();
        assert_eq!(calc.next_billing_date(start, BillingCycle::Monthly), start);
    }
}
