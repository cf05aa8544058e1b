// crates/serve/src/types/block/visitor.rs

//! Filters applied to each block instance before it is resolved.
//!
//! A visitor returns the (possibly adjusted) block, or `None` to drop it.

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Utc, Weekday};
use domain::property::PropertyType;
use serde_json::Value as Json;
use std::sync::Arc;

use crate::ctx::ResolveAttributes;

pub trait BlockVisitor: Send + Sync {
    fn visit(&self, block: PropertyType, attributes: &ResolveAttributes) -> Option<PropertyType>;
}

pub fn default_visitors() -> Vec<Arc<dyn BlockVisitor>> {
    vec![
        Arc::new(HiddenBlockVisitor),
        Arc::new(SegmentBlockVisitor),
        Arc::new(ScheduleBlockVisitor),
    ]
}

fn flag(block: &PropertyType, key: &str) -> bool {
    matches!(block.setting(key), Some(Json::Bool(true)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Hidden
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenBlockVisitor;

impl BlockVisitor for HiddenBlockVisitor {
    fn visit(&self, block: PropertyType, _attributes: &ResolveAttributes) -> Option<PropertyType> {
        (!flag(&block, "hidden")).then_some(block)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Segment
// ─────────────────────────────────────────────────────────────────────────────

/// Drops blocks pinned to a different segment of the current webspace.
/// Without a request segment every block is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentBlockVisitor;

impl BlockVisitor for SegmentBlockVisitor {
    fn visit(&self, block: PropertyType, attributes: &ResolveAttributes) -> Option<PropertyType> {
        if !flag(&block, "segment_enabled") {
            return Some(block);
        }

        let Some(segment) = attributes.request.segment() else {
            return Some(block);
        };

        let pinned = block
            .setting("segments")
            .and_then(|s| s.get(attributes.webspace_key()))
            .and_then(Json::as_str);

        match pinned {
            Some(pinned) if pinned != segment => None,
            _ => Some(block),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Schedule
// ─────────────────────────────────────────────────────────────────────────────

/// Keeps a scheduled block only while one of its schedules matches the
/// request time. Times are UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleBlockVisitor;

impl BlockVisitor for ScheduleBlockVisitor {
    fn visit(&self, block: PropertyType, attributes: &ResolveAttributes) -> Option<PropertyType> {
        if !flag(&block, "schedules_enabled") {
            return Some(block);
        }

        let schedules = match block.setting("schedules").and_then(Json::as_array) {
            Some(schedules) if !schedules.is_empty() => schedules,
            _ => return Some(block),
        };

        let now = attributes.request.now();
        let active = schedules.iter().any(|schedule| schedule_matches(schedule, now));

        active.then_some(block)
    }
}

fn schedule_matches(schedule: &Json, now: DateTime<Utc>) -> bool {
    match schedule.get("type").and_then(Json::as_str) {
        Some("fixed") => {
            let start = schedule.get("start").and_then(Json::as_str).and_then(parse_datetime);
            let end = schedule.get("end").and_then(Json::as_str).and_then(parse_datetime);

            start.is_none_or(|start| now >= start) && end.is_none_or(|end| now <= end)
        }
        Some("weekly") => {
            let today = weekday_name(now.weekday());
            let on_day = schedule
                .get("days")
                .and_then(Json::as_array)
                .is_some_and(|days| {
                    days.iter()
                        .filter_map(Json::as_str)
                        .any(|d| d.eq_ignore_ascii_case(today))
                });
            if !on_day {
                return false;
            }

            let start = schedule.get("start").and_then(Json::as_str).and_then(parse_time);
            let end = schedule.get("end").and_then(Json::as_str).and_then(parse_time);
            let time = now.time();

            start.is_none_or(|start| time >= start) && end.is_none_or(|end| time <= end)
        }
        _ => false,
    }
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]` taken as UTC.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}
