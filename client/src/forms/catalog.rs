//! Add/edit forms for hotels, packages and flights.
//!
//! Edit screens prefill a form from the loaded record with `from_record`; the
//! add screens start from `Default`. Numeric inputs must parse and be greater
//! than zero. List inputs (amenities, inclusions, image URLs) are
//! comma-separated.

use super::{Form, ValidationErrors, list, positive, present, required};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use travel_desk_api::types::{Flight, FlightDraft, Hotel, HotelDraft, PackageDraft, TravelPackage};

/// Highest guest rating
pub const MAX_RATING: f64 = 5.0;

/// Format of a `datetime-local` input, read as UTC
const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

fn joined(items: &[String]) -> String {
    items.join(", ")
}

// ═══════════════════════════════════════════════════════════════════════
// Hotels
// ═══════════════════════════════════════════════════════════════════════

/// Fields of [`HotelForm`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotelField {
    /// Name
    Name,
    /// City
    City,
    /// Street address
    Address,
    /// Description
    Description,
    /// Nightly rate
    PricePerNight,
    /// Rating, 0 to 5
    Rating,
    /// Comma-separated amenities
    Amenities,
    /// Comma-separated image URLs
    Images,
    /// Rooms available
    RoomsAvailable,
}

/// Add/edit hotel form
#[derive(Clone, Debug, Default)]
#[allow(missing_docs)]
pub struct HotelForm {
    pub name: String,
    pub city: String,
    pub address: String,
    pub description: String,
    pub price_per_night: String,
    pub rating: String,
    pub amenities: String,
    pub images: String,
    pub rooms_available: String,
}

impl HotelForm {
    /// Prefill from an existing hotel
    #[must_use]
    pub fn from_record(hotel: &Hotel) -> Self {
        Self {
            name: hotel.name.clone(),
            city: hotel.city.clone(),
            address: hotel.address.clone(),
            description: hotel.description.clone(),
            price_per_night: hotel.price_per_night.to_string(),
            rating: hotel.rating.to_string(),
            amenities: joined(&hotel.amenities),
            images: joined(&hotel.images),
            rooms_available: hotel.rooms_available.to_string(),
        }
    }
}

impl Form for HotelForm {
    type Field = HotelField;
    type Output = HotelDraft;

    fn key(field: HotelField) -> &'static str {
        match field {
            HotelField::Name => "name",
            HotelField::City => "city",
            HotelField::Address => "address",
            HotelField::Description => "description",
            HotelField::PricePerNight => "price_per_night",
            HotelField::Rating => "rating",
            HotelField::Amenities => "amenities",
            HotelField::Images => "images",
            HotelField::RoomsAvailable => "rooms_available",
        }
    }

    fn set(&mut self, field: HotelField, value: String) {
        let slot = match field {
            HotelField::Name => &mut self.name,
            HotelField::City => &mut self.city,
            HotelField::Address => &mut self.address,
            HotelField::Description => &mut self.description,
            HotelField::PricePerNight => &mut self.price_per_night,
            HotelField::Rating => &mut self.rating,
            HotelField::Amenities => &mut self.amenities,
            HotelField::Images => &mut self.images,
            HotelField::RoomsAvailable => &mut self.rooms_available,
        };
        *slot = value;
    }

    fn validate(&self) -> Result<HotelDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "name", "Hotel name", &self.name);
        required(&mut errors, "city", "City", &self.city);
        let price = positive::<f64>(&mut errors, "price_per_night", "Price per night", &self.price_per_night);
        let rooms = positive::<u32>(&mut errors, "rooms_available", "Rooms available", &self.rooms_available);

        // Blank means unrated
        let rating = match present(&self.rating).map(str::parse::<f64>) {
            None => Some(0.0),
            Some(Ok(rating)) if (0.0..=MAX_RATING).contains(&rating) => Some(rating),
            Some(_) => {
                errors.insert("rating", format!("Rating must be between 0 and {MAX_RATING}"));
                None
            },
        };

        match (price, rooms, rating) {
            (Some(price_per_night), Some(rooms_available), Some(rating)) if errors.is_empty() => {
                Ok(HotelDraft {
                    name: self.name.trim().to_string(),
                    city: self.city.trim().to_string(),
                    address: self.address.trim().to_string(),
                    description: self.description.trim().to_string(),
                    price_per_night,
                    rating,
                    amenities: list(&self.amenities),
                    images: list(&self.images),
                    rooms_available,
                })
            },
            _ => Err(errors),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Packages
// ═══════════════════════════════════════════════════════════════════════

/// Fields of [`PackageForm`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackageField {
    /// Title
    Title,
    /// Destination
    Destination,
    /// Length in days
    DurationDays,
    /// Price per traveler
    Price,
    /// Description
    Description,
    /// Comma-separated inclusions
    Inclusions,
    /// Comma-separated image URLs
    Images,
    /// Group size limit
    MaxTravelers,
}

/// Add/edit package form
#[derive(Clone, Debug, Default)]
#[allow(missing_docs)]
pub struct PackageForm {
    pub title: String,
    pub destination: String,
    pub duration_days: String,
    pub price: String,
    pub description: String,
    pub inclusions: String,
    pub images: String,
    pub max_travelers: String,
}

impl PackageForm {
    /// Prefill from an existing package
    #[must_use]
    pub fn from_record(package: &TravelPackage) -> Self {
        Self {
            title: package.title.clone(),
            destination: package.destination.clone(),
            duration_days: package.duration_days.to_string(),
            price: package.price.to_string(),
            description: package.description.clone(),
            inclusions: joined(&package.inclusions),
            images: joined(&package.images),
            max_travelers: package.max_travelers.to_string(),
        }
    }
}

impl Form for PackageForm {
    type Field = PackageField;
    type Output = PackageDraft;

    fn key(field: PackageField) -> &'static str {
        match field {
            PackageField::Title => "title",
            PackageField::Destination => "destination",
            PackageField::DurationDays => "duration_days",
            PackageField::Price => "price",
            PackageField::Description => "description",
            PackageField::Inclusions => "inclusions",
            PackageField::Images => "images",
            PackageField::MaxTravelers => "max_travelers",
        }
    }

    fn set(&mut self, field: PackageField, value: String) {
        let slot = match field {
            PackageField::Title => &mut self.title,
            PackageField::Destination => &mut self.destination,
            PackageField::DurationDays => &mut self.duration_days,
            PackageField::Price => &mut self.price,
            PackageField::Description => &mut self.description,
            PackageField::Inclusions => &mut self.inclusions,
            PackageField::Images => &mut self.images,
            PackageField::MaxTravelers => &mut self.max_travelers,
        };
        *slot = value;
    }

    fn validate(&self) -> Result<PackageDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "title", "Title", &self.title);
        required(&mut errors, "destination", "Destination", &self.destination);
        let days = positive::<u32>(&mut errors, "duration_days", "Duration", &self.duration_days);
        let price = positive::<f64>(&mut errors, "price", "Price", &self.price);
        let travelers = positive::<u32>(&mut errors, "max_travelers", "Max travelers", &self.max_travelers);

        match (days, price, travelers) {
            (Some(duration_days), Some(price), Some(max_travelers)) if errors.is_empty() => {
                Ok(PackageDraft {
                    title: self.title.trim().to_string(),
                    destination: self.destination.trim().to_string(),
                    duration_days,
                    price,
                    description: self.description.trim().to_string(),
                    inclusions: list(&self.inclusions),
                    images: list(&self.images),
                    max_travelers,
                })
            },
            _ => Err(errors),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Flights
// ═══════════════════════════════════════════════════════════════════════

/// Fields of [`FlightForm`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightField {
    /// Airline
    Airline,
    /// Flight number
    FlightNumber,
    /// Origin airport or city
    Origin,
    /// Destination airport or city
    Destination,
    /// Departure time
    DepartureAt,
    /// Arrival time
    ArrivalAt,
    /// Fare
    Price,
    /// Seats available
    SeatsAvailable,
}

/// Add/edit flight form
#[derive(Clone, Debug, Default)]
#[allow(missing_docs)]
pub struct FlightForm {
    pub airline: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_at: String,
    pub arrival_at: String,
    pub price: String,
    pub seats_available: String,
}

impl FlightForm {
    /// Prefill from an existing flight
    #[must_use]
    pub fn from_record(flight: &Flight) -> Self {
        Self {
            airline: flight.airline.clone(),
            flight_number: flight.flight_number.clone(),
            origin: flight.origin.clone(),
            destination: flight.destination.clone(),
            departure_at: flight.departure_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            arrival_at: flight.arrival_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            price: flight.price.to_string(),
            seats_available: flight.seats_available.to_string(),
        }
    }
}

/// Parse an RFC 3339 timestamp or a `datetime-local` value (taken as UTC)
#[must_use]
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, LOCAL_INPUT_FORMAT)
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn datetime(errors: &mut ValidationErrors, field: &'static str, label: &str, value: &str) -> Option<DateTime<Utc>> {
    if present(value).is_none() {
        errors.insert(field, format!("{label} is required"));
        return None;
    }
    let parsed = parse_datetime(value);
    if parsed.is_none() {
        errors.insert(field, format!("{label} is not a valid date and time"));
    }
    parsed
}

impl Form for FlightForm {
    type Field = FlightField;
    type Output = FlightDraft;

    fn key(field: FlightField) -> &'static str {
        match field {
            FlightField::Airline => "airline",
            FlightField::FlightNumber => "flight_number",
            FlightField::Origin => "origin",
            FlightField::Destination => "destination",
            FlightField::DepartureAt => "departure_at",
            FlightField::ArrivalAt => "arrival_at",
            FlightField::Price => "price",
            FlightField::SeatsAvailable => "seats_available",
        }
    }

    fn set(&mut self, field: FlightField, value: String) {
        let slot = match field {
            FlightField::Airline => &mut self.airline,
            FlightField::FlightNumber => &mut self.flight_number,
            FlightField::Origin => &mut self.origin,
            FlightField::Destination => &mut self.destination,
            FlightField::DepartureAt => &mut self.departure_at,
            FlightField::ArrivalAt => &mut self.arrival_at,
            FlightField::Price => &mut self.price,
            FlightField::SeatsAvailable => &mut self.seats_available,
        };
        *slot = value;
    }

    fn validate(&self) -> Result<FlightDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "airline", "Airline", &self.airline);
        required(&mut errors, "flight_number", "Flight number", &self.flight_number);
        required(&mut errors, "origin", "Origin", &self.origin);
        required(&mut errors, "destination", "Destination", &self.destination);

        if let (Some(origin), Some(destination)) = (present(&self.origin), present(&self.destination)) {
            if origin.eq_ignore_ascii_case(destination) {
                errors.insert("destination", "Destination must differ from origin");
            }
        }

        let departure = datetime(&mut errors, "departure_at", "Departure", &self.departure_at);
        let arrival = datetime(&mut errors, "arrival_at", "Arrival", &self.arrival_at);
        if matches!((departure, arrival), (Some(departure), Some(arrival)) if arrival <= departure) {
            errors.insert("arrival_at", "Arrival must be after departure");
        }

        let price = positive::<f64>(&mut errors, "price", "Price", &self.price);
        let seats = positive::<u32>(&mut errors, "seats_available", "Seats available", &self.seats_available);

        match (departure, arrival, price, seats) {
            (Some(departure_at), Some(arrival_at), Some(price), Some(seats_available))
                if errors.is_empty() =>
            {
                Ok(FlightDraft {
                    airline: self.airline.trim().to_string(),
                    flight_number: self.flight_number.trim().to_uppercase(),
                    origin: self.origin.trim().to_string(),
                    destination: self.destination.trim().to_string(),
                    departure_at,
                    arrival_at,
                    price,
                    seats_available,
                })
            },
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic, clippy::unwrap_used)] // Test code can panic

    use super::*;
    use crate::forms::FormState;
    use chrono::TimeZone;
    use travel_desk_api::types::{FlightId, HotelId};

    fn flight_form() -> FlightForm {
        FlightForm {
            airline: "IndiGo".to_string(),
            flight_number: "6e 204".to_string(),
            origin: "DEL".to_string(),
            destination: "BOM".to_string(),
            departure_at: "2025-04-01T06:30".to_string(),
            arrival_at: "2025-04-01T08:45:00Z".to_string(),
            price: "5400".to_string(),
            seats_available: "120".to_string(),
        }
    }

    #[test]
    fn test_flight_form_builds_draft() {
        let Ok(draft) = flight_form().validate() else {
            panic!("expected a valid flight");
        };

        assert_eq!(draft.flight_number, "6E 204");
        assert_eq!(draft.departure_at, Utc.with_ymd_and_hms(2025, 4, 1, 6, 30, 0).unwrap());
        assert_eq!(draft.arrival_at, Utc.with_ymd_and_hms(2025, 4, 1, 8, 45, 0).unwrap());
    }

    #[test]
    fn test_arrival_must_follow_departure() {
        let form = FlightForm {
            arrival_at: "2025-04-01T06:30".to_string(),
            ..flight_form()
        };

        let errors = form.validate().err().unwrap_or_default();
        assert_eq!(errors.get("arrival_at"), Some("Arrival must be after departure"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_origin_and_destination_differ() {
        let form = FlightForm {
            destination: " del ".to_string(),
            ..flight_form()
        };

        let errors = form.validate().err().unwrap_or_default();
        assert_eq!(errors.get("destination"), Some("Destination must differ from origin"));
    }

    #[test]
    fn test_flight_prefill_round_trips() {
        let flight = Flight {
            id: FlightId::new("f-1"),
            airline: "Vistara".to_string(),
            flight_number: "UK 955".to_string(),
            origin: "BLR".to_string(),
            destination: "DEL".to_string(),
            departure_at: Utc.with_ymd_and_hms(2025, 5, 2, 21, 0, 0).unwrap(),
            arrival_at: Utc.with_ymd_and_hms(2025, 5, 3, 0, 10, 0).unwrap(),
            price: 6100.0,
            seats_available: 8,
        };

        let Ok(draft) = FlightForm::from_record(&flight).validate() else {
            panic!("prefilled form should validate");
        };
        assert_eq!(draft.arrival_at, flight.arrival_at);
        assert_eq!(draft.seats_available, 8);
    }

    #[test]
    fn test_hotel_form_numbers_and_lists() {
        let mut form = FormState::new(HotelForm::default());
        form.set(HotelField::Name, "Sea Breeze");
        form.set(HotelField::City, "Goa");
        form.set(HotelField::PricePerNight, "-20");
        form.set(HotelField::RoomsAvailable, "12");
        form.set(HotelField::Rating, "7");
        form.set(HotelField::Amenities, "pool, wifi");

        assert!(form.submit().is_none());
        assert_eq!(form.error(HotelField::PricePerNight), Some("Price per night must be greater than zero"));
        assert_eq!(form.error(HotelField::Rating), Some("Rating must be between 0 and 5"));

        form.set(HotelField::PricePerNight, "3200");
        form.set(HotelField::Rating, "");

        let Some(draft) = form.submit() else {
            panic!("expected a valid hotel");
        };
        assert_eq!(draft.amenities, vec!["pool", "wifi"]);
        assert!(draft.rating.abs() < f64::EPSILON);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_non_finite_prices_never_reach_a_draft() {
        let mut form = FormState::new(HotelForm::default());
        form.set(HotelField::Name, "Sea Breeze");
        form.set(HotelField::City, "Goa");
        form.set(HotelField::PricePerNight, "inf");
        form.set(HotelField::RoomsAvailable, "4");
        assert!(form.submit().is_none());
        assert_eq!(form.error(HotelField::PricePerNight), Some("Price per night must be a number"));

        let flight = FlightForm {
            price: "NaN".to_string(),
            ..flight_form()
        };
        let errors = flight.validate().err().unwrap_or_default();
        assert_eq!(errors.get("price"), Some("Price must be a number"));

        let rated = HotelForm {
            name: "Sea Breeze".to_string(),
            city: "Goa".to_string(),
            price_per_night: "3200".to_string(),
            rooms_available: "4".to_string(),
            rating: "NaN".to_string(),
            ..HotelForm::default()
        };
        assert!(rated.validate().err().unwrap_or_default().contains("rating"));
    }

    #[test]
    fn test_hotel_prefill() {
        let hotel = Hotel {
            id: HotelId::new("h-1"),
            name: "Lake View".to_string(),
            city: "Udaipur".to_string(),
            address: String::new(),
            description: String::new(),
            price_per_night: 4500.0,
            rating: 4.5,
            amenities: vec!["spa".to_string(), "boat".to_string()],
            images: Vec::new(),
            rooms_available: 3,
            created_at: None,
        };

        let form = HotelForm::from_record(&hotel);
        assert_eq!(form.amenities, "spa, boat");

        let Ok(draft) = form.validate() else {
            panic!("prefilled form should validate");
        };
        assert!((draft.rating - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_package_form_requires_positive_duration() {
        let form = PackageForm {
            title: "Kerala Backwaters".to_string(),
            destination: "Alleppey".to_string(),
            duration_days: "0".to_string(),
            price: "18999".to_string(),
            max_travelers: "4".to_string(),
            ..PackageForm::default()
        };

        let errors = form.validate().err().unwrap_or_default();
        assert_eq!(errors.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["duration_days"]);
    }
}
