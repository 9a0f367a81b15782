//! Catalog Records
//!
//! Conversions from backend catalog payloads to domain types.

use jiff::civil::Date;
use kiosk::{
    accounts::{AccountGroup, DonationAccount},
    alerts::{BlockedRange, SchedulingMetadata, WeekSchedule, parse_cut_off_time, parse_default_values},
    ids::{AccountId, GroupId},
};
use tracing::warn;

use crate::backend::{AccountRecord, BlockedDaysRecord, GroupRecord};

pub(super) fn group_from_record(record: GroupRecord) -> AccountGroup {
    AccountGroup {
        id: GroupId::new(record.sys_id),
        name: record.name,
        description: record.description.unwrap_or_default(),
        image_url: record.image_url.filter(|url| !url.is_empty()),
    }
}

pub(super) fn account_from_record(record: AccountRecord) -> DonationAccount {
    let id = AccountId::new(record.sys_id);
    let mut schedule = SchedulingMetadata::default();

    if let Some(days) = record.advance_notice_days {
        schedule.advance_notice_days = days;
    }

    if let Some(value) = record.week_schedule.as_deref().filter(|v| !v.trim().is_empty()) {
        match value.parse::<WeekSchedule>() {
            Ok(week) => schedule.week_schedule = week,
            Err(error) => warn!(account = %id, %error, "ignoring week schedule"),
        }
    }

    if let Some(value) = record.cut_off_time.as_deref() {
        match parse_cut_off_time(value) {
            Ok(cut_off) => schedule.cut_off_time = cut_off,
            Err(error) => warn!(account = %id, %error, "ignoring cut-off time"),
        }
    }

    if let Some(value) = record.default_values.as_deref() {
        schedule.default_values = parse_default_values(value);
    }

    DonationAccount {
        id,
        name: record.display_name,
        fee: record.fees,
        is_alert: record.alert,
        is_tax_deductible: record.is_tax_deductible,
        notes: record.notes.unwrap_or_default(),
        schedule,
    }
}

/// Blocked days arrive as dates or datetimes; only the calendar date matters.
fn parse_day(value: &str) -> Option<Date> {
    let value = value.trim();

    value.get(..10).unwrap_or(value).parse::<Date>().ok()
}

pub(super) fn blocked_range_from_record(record: &BlockedDaysRecord) -> Option<BlockedRange> {
    let (Some(start), Some(end)) = (parse_day(&record.start_date), parse_day(&record.end_date))
    else {
        warn!(
            name = %record.name,
            start = %record.start_date,
            end = %record.end_date,
            "skipping unreadable blocked range"
        );

        return None;
    };

    Some(BlockedRange { start, end })
}
