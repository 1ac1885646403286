//! Chart-ready aggregates for the agent dashboard.
//!
//! Every function here is pure and order-preserving: grouping keeps the order
//! in which a category was first seen, and top-N selection is a stable sort, so
//! ties keep source order. Nothing is cached; callers recompute from slice
//! state whenever it changes.

use crate::app::AppState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use travel_desk_api::types::{Booking, BookingKind, BookingStatus, Flight, Hotel, Payment, PaymentStatus, TravelPackage};

/// One bar or slice of a chart
#[derive(Clone, Debug, PartialEq)]
pub struct ChartPoint {
    /// Category or item label
    pub label: String,
    /// Plotted value
    pub value: f64,
}

impl ChartPoint {
    /// Point with `label` and `value`
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Unit conversion
// ═══════════════════════════════════════════════════════════════════════

/// Smallest currency unit to major units (paise to rupees, cents to dollars)
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn minor_to_major(amount_minor: i64) -> f64 {
    amount_minor as f64 / 100.0
}

/// Scheduled flight time in hours
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn flight_duration_hours(flight: &Flight) -> f64 {
    (flight.arrival_at - flight.departure_at).num_minutes() as f64 / 60.0
}

// ═══════════════════════════════════════════════════════════════════════
// Selection and grouping
// ═══════════════════════════════════════════════════════════════════════

/// The `n` items with the largest key, ties in source order
///
/// `NaN` keys rank below every number.
pub fn top_n<'a, T, F>(items: impl IntoIterator<Item = &'a T>, n: usize, key: F) -> Vec<&'a T>
where
    T: 'a,
    F: Fn(&T) -> f64,
{
    let rank = |item: &T| {
        let value = key(item);
        if value.is_nan() { f64::NEG_INFINITY } else { value }
    };

    let mut ranked: Vec<&T> = items.into_iter().collect();
    ranked.sort_by(|a, b| rank(b).total_cmp(&rank(a)));
    ranked.truncate(n);
    ranked
}

/// Sum `value` per `label`, categories in first-seen order
pub fn group_totals<'a, T, L, V>(items: impl IntoIterator<Item = &'a T>, label: L, value: V) -> Vec<ChartPoint>
where
    T: 'a,
    L: Fn(&T) -> String,
    V: Fn(&T) -> f64,
{
    let mut points: Vec<ChartPoint> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = label(item);
        let amount = value(item);
        if let Some(&i) = index.get(&key) {
            points[i].value += amount;
        } else {
            index.insert(key.clone(), points.len());
            points.push(ChartPoint::new(key, amount));
        }
    }
    points
}

// ═══════════════════════════════════════════════════════════════════════
// Series
// ═══════════════════════════════════════════════════════════════════════

/// Best-rated hotels
#[must_use]
pub fn top_hotels_by_rating(hotels: &[Hotel], n: usize) -> Vec<ChartPoint> {
    top_n(hotels, n, |h| h.rating)
        .into_iter()
        .map(|h| ChartPoint::new(h.name.clone(), h.rating))
        .collect()
}

/// Revenue earned by each package from confirmed or completed bookings
#[must_use]
pub fn package_revenue(packages: &[TravelPackage], bookings: &[Booking]) -> Vec<ChartPoint> {
    let mut earned: HashMap<&str, f64> = HashMap::new();
    for booking in bookings
        .iter()
        .filter(|b| b.kind == BookingKind::Package && b.status.is_revenue())
    {
        *earned.entry(booking.item_id.as_str()).or_default() += booking.amount;
    }

    packages
        .iter()
        .map(|p| ChartPoint::new(p.title.clone(), earned.get(p.id.as_str()).copied().unwrap_or_default()))
        .collect()
}

/// Packages with the most booking revenue
#[must_use]
pub fn top_packages_by_revenue(packages: &[TravelPackage], bookings: &[Booking], n: usize) -> Vec<ChartPoint> {
    let revenue = package_revenue(packages, bookings);
    top_n(&revenue, n, |p| p.value).into_iter().cloned().collect()
}

/// Number of bookings in each status
#[must_use]
pub fn bookings_per_status(bookings: &[Booking]) -> Vec<ChartPoint> {
    group_totals(bookings, |b| b.status.label().to_string(), |_| 1.0)
}

/// Earned revenue per booking kind
#[must_use]
pub fn revenue_per_kind(bookings: &[Booking]) -> Vec<ChartPoint> {
    group_totals(
        bookings.iter().filter(|b| b.status.is_revenue()),
        |b| b.kind.label().to_string(),
        |b| b.amount,
    )
}

/// Earned revenue per calendar month (`YYYY-MM`)
#[must_use]
pub fn revenue_per_month(bookings: &[Booking]) -> Vec<ChartPoint> {
    group_totals(
        bookings.iter().filter(|b| b.status.is_revenue()),
        |b| b.created_at.format("%Y-%m").to_string(),
        |b| b.amount,
    )
}

/// Flight time per flight, in hours
#[must_use]
pub fn flight_durations(flights: &[Flight]) -> Vec<ChartPoint> {
    flights
        .iter()
        .map(|f| ChartPoint::new(f.flight_number.clone(), flight_duration_hours(f)))
        .collect()
}

/// Total of paid payments in major units
#[must_use]
pub fn payments_collected(payments: &[Payment]) -> f64 {
    minor_to_major(
        payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Paid)
            .fold(0_i64, |total, p| total.saturating_add(p.amount_minor)),
    )
}

// ═══════════════════════════════════════════════════════════════════════
// Summary
// ═══════════════════════════════════════════════════════════════════════

/// Headline numbers and series for the agent dashboard
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardSummary {
    /// Hotels listed
    pub hotels: usize,
    /// Packages listed
    pub packages: usize,
    /// Flights listed
    pub flights: usize,
    /// Bookings loaded
    pub bookings: usize,
    /// Bookings still pending
    pub pending_bookings: usize,
    /// Flights departing after `now`
    pub upcoming_flights: usize,
    /// Earned booking revenue in major units
    pub booking_revenue: f64,
    /// Paid payments in major units
    pub payments_collected: f64,
    /// Unread chat messages
    pub unread_messages: u32,
    /// Bookings per status
    pub status_breakdown: Vec<ChartPoint>,
    /// Revenue per booking kind
    pub revenue_by_kind: Vec<ChartPoint>,
    /// Revenue per month
    pub revenue_by_month: Vec<ChartPoint>,
    /// Five best-rated hotels
    pub top_hotels: Vec<ChartPoint>,
    /// Five best-earning packages
    pub top_packages: Vec<ChartPoint>,
}

impl DashboardSummary {
    /// Entries in each top-N series
    pub const TOP_N: usize = 5;

    /// Aggregate the loaded slices
    #[must_use]
    pub fn compute(state: &AppState, now: DateTime<Utc>) -> Self {
        let hotels = state.hotels.items.as_slice();
        let packages = state.packages.items.as_slice();
        let flights = state.flights.items.as_slice();
        let bookings = state.bookings.items.as_slice();
        let revenue_by_kind = revenue_per_kind(bookings);

        Self {
            hotels: hotels.len(),
            packages: packages.len(),
            flights: flights.len(),
            bookings: bookings.len(),
            pending_bookings: bookings
                .iter()
                .filter(|b| b.status == BookingStatus::Pending)
                .count(),
            upcoming_flights: flights.iter().filter(|f| f.departure_at > now).count(),
            booking_revenue: revenue_by_kind.iter().map(|p| p.value).sum(),
            payments_collected: payments_collected(state.payment.payments.as_slice()),
            unread_messages: state.chat.unread_count,
            status_breakdown: bookings_per_status(bookings),
            revenue_by_kind,
            revenue_by_month: revenue_per_month(bookings),
            top_hotels: top_hotels_by_rating(hotels, Self::TOP_N),
            top_packages: top_packages_by_revenue(packages, bookings, Self::TOP_N),
        }
    }
}
