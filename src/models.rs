use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerType {
    Economy,
    Vip,
    Bicycle,
}

impl PassengerType {
    pub fn as_str(self) -> &'static str {
        match self {
            PassengerType::Economy => "Economy",
            PassengerType::Vip => "VIP",
            PassengerType::Bicycle => "Bicycle",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Economy" => Some(PassengerType::Economy),
            "VIP" => Some(PassengerType::Vip),
            "Bicycle" => Some(PassengerType::Bicycle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateVehicle {
    Motorcycle,
    SaloonCar,
    CarAndTrailer,
    TractorHead,
    TractorAndTrailer,
    PremiumPriorityPass,
    PriorityPassPerishable,
    DemDikk,
}

impl PrivateVehicle {
    pub fn as_str(self) -> &'static str {
        match self {
            PrivateVehicle::Motorcycle => "Motorcycle",
            PrivateVehicle::SaloonCar => "Saloon Car",
            PrivateVehicle::CarAndTrailer => "Car and Trailer",
            PrivateVehicle::TractorHead => "Tractor (Head)",
            PrivateVehicle::TractorAndTrailer => "Tractor & Trailer",
            PrivateVehicle::PremiumPriorityPass => "Premium/Priority Pass (VIP)",
            PrivateVehicle::PriorityPassPerishable => "Priority Pass for Perishable",
            PrivateVehicle::DemDikk => "Dem Dikk (All Inclusive)",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Motorcycle" => Some(PrivateVehicle::Motorcycle),
            "Saloon Car" => Some(PrivateVehicle::SaloonCar),
            "Car and Trailer" => Some(PrivateVehicle::CarAndTrailer),
            "Tractor (Head)" => Some(PrivateVehicle::TractorHead),
            "Tractor & Trailer" => Some(PrivateVehicle::TractorAndTrailer),
            "Premium/Priority Pass (VIP)" => Some(PrivateVehicle::PremiumPriorityPass),
            "Priority Pass for Perishable" => Some(PrivateVehicle::PriorityPassPerishable),
            "Dem Dikk (All Inclusive)" => Some(PrivateVehicle::DemDikk),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommercialClass {
    Pax1To14,
    Pax15To20,
    Pax21To35,
    Pax36To44MiniVan,
    Pax45AndAbove,
    TaxiBaggageEmpty,
}

impl CommercialClass {
    pub fn as_str(self) -> &'static str {
        match self {
            CommercialClass::Pax1To14 => "1 to 14 PAX",
            CommercialClass::Pax15To20 => "15 to 20 PAX",
            CommercialClass::Pax21To35 => "21 to 35 PAX",
            CommercialClass::Pax36To44MiniVan => "36 to 44 PAX Mini Van",
            CommercialClass::Pax45AndAbove => "45 to Above",
            CommercialClass::TaxiBaggageEmpty => "Taxi Baggage (Empty)",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1 to 14 PAX" => Some(CommercialClass::Pax1To14),
            "15 to 20 PAX" => Some(CommercialClass::Pax15To20),
            "21 to 35 PAX" => Some(CommercialClass::Pax21To35),
            "36 to 44 PAX Mini Van" => Some(CommercialClass::Pax36To44MiniVan),
            "45 to Above" => Some(CommercialClass::Pax45AndAbove),
            "Taxi Baggage (Empty)" => Some(CommercialClass::TaxiBaggageEmpty),
            _ => None,
        }
    }
}

/// Validated vehicle line of a booking request. The request carries a free
/// string plus optional dimensions; unknown type names are rejected during
/// validation rather than priced at zero.
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleSelection {
    None,
    Private(PrivateVehicle),
    Commercial(CommercialClass),
    Foreign { weight_tons: f64, length_meters: f64 },
}

pub const FOREIGN_VEHICLE_TYPE: &str = "Foreign Vehicle";
const COMMERCIAL_PREFIX: &str = "Commercial ";

#[derive(Debug, PartialEq, Eq)]
pub enum VehicleParseError {
    UnknownType(String),
    MissingDimensions,
}

impl VehicleSelection {
    pub fn parse(
        vehicle_type: Option<&str>,
        weight_tons: Option<f64>,
        length_meters: Option<f64>,
    ) -> Result<Self, VehicleParseError> {
        let Some(raw) = vehicle_type.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(VehicleSelection::None);
        };
        if raw.eq_ignore_ascii_case("none") {
            return Ok(VehicleSelection::None);
        }
        if raw == FOREIGN_VEHICLE_TYPE {
            let (Some(weight_tons), Some(length_meters)) = (weight_tons, length_meters) else {
                return Err(VehicleParseError::MissingDimensions);
            };
            if !(weight_tons > 0.0) || !(length_meters > 0.0) {
                return Err(VehicleParseError::MissingDimensions);
            }
            return Ok(VehicleSelection::Foreign {
                weight_tons,
                length_meters,
            });
        }
        if let Some(rest) = raw.strip_prefix(COMMERCIAL_PREFIX) {
            return CommercialClass::parse(rest)
                .map(VehicleSelection::Commercial)
                .ok_or_else(|| VehicleParseError::UnknownType(raw.to_string()));
        }
        // Taxi baggage sits in the commercial section of the tariff sheet but
        // arrives without the prefix.
        if let Some(taxi) = CommercialClass::parse(raw).filter(|c| *c == CommercialClass::TaxiBaggageEmpty)
        {
            return Ok(VehicleSelection::Commercial(taxi));
        }
        PrivateVehicle::parse(raw)
            .map(VehicleSelection::Private)
            .ok_or_else(|| VehicleParseError::UnknownType(raw.to_string()))
    }

    pub fn type_name(&self) -> Option<String> {
        match self {
            VehicleSelection::None => None,
            VehicleSelection::Private(v) => Some(v.as_str().to_string()),
            VehicleSelection::Commercial(c) => {
                if *c == CommercialClass::TaxiBaggageEmpty {
                    Some(c.as_str().to_string())
                } else {
                    Some(format!("{COMMERCIAL_PREFIX}{}", c.as_str()))
                }
            }
            VehicleSelection::Foreign { .. } => Some(FOREIGN_VEHICLE_TYPE.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Pending" => Some(BookingStatus::Pending),
            "Confirmed" => Some(BookingStatus::Confirmed),
            "Cancelled" => Some(BookingStatus::Cancelled),
            "Completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingPaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl BookingPaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingPaymentStatus::Pending => "Pending",
            BookingPaymentStatus::Paid => "Paid",
            BookingPaymentStatus::Failed => "Failed",
            BookingPaymentStatus::Refunded => "Refunded",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Pending" => Some(BookingPaymentStatus::Pending),
            "Paid" => Some(BookingPaymentStatus::Paid),
            "Failed" => Some(BookingPaymentStatus::Failed),
            "Refunded" => Some(BookingPaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// Local mirror of one payment attempt. `requires_payment_method` exists in
/// gateway snapshots and is accepted on read, but this service never writes
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    RequiresPaymentMethod,
    Pending,
    Successful,
    Failed,
    Cancelled,
}

impl PaymentState {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentState::RequiresPaymentMethod => "requires_payment_method",
            PaymentState::Pending => "pending",
            PaymentState::Successful => "successful",
            PaymentState::Failed => "failed",
            PaymentState::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "requires_payment_method" => Some(PaymentState::RequiresPaymentMethod),
            "pending" => Some(PaymentState::Pending),
            "successful" => Some(PaymentState::Successful),
            "failed" => Some(PaymentState::Failed),
            "cancelled" => Some(PaymentState::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    MobileMoney,
    Wave,
    Cash,
    Card,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::MobileMoney => "Mobile Money",
            PaymentMethod::Wave => "Wave",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Mobile Money" => Some(PaymentMethod::MobileMoney),
            "Wave" => Some(PaymentMethod::Wave),
            "Cash" => Some(PaymentMethod::Cash),
            "Card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

fn default_num_passengers() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingReq {
    pub schedule_id: String,
    pub passenger_name: Option<String>,
    pub passenger_email: Option<String>,
    pub passenger_phone: Option<String>,
    #[serde(default = "default_num_passengers")]
    pub num_passengers: i32,
    pub passenger_type: Option<String>,
    pub departure_date: Option<String>,
    pub vehicle_type: Option<String>,
    pub vehicle_plate: Option<String>,
    pub vehicle_weight_tons: Option<f64>,
    pub vehicle_length_meters: Option<f64>,
    #[serde(default)]
    pub cattle: i32,
    #[serde(default)]
    pub sheep_goats: i32,
    #[serde(default)]
    pub rice_bags: i32,
    #[serde(default)]
    pub groundnut_bags: i32,
    #[serde(default)]
    pub cement_bags: i32,
    #[serde(default)]
    pub cartons: i32,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct FerryOut {
    pub id: String,
    pub ferry_name: String,
    pub ferry_code: String,
    pub ferry_type: String,
    pub status: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct RouteOut {
    pub id: String,
    pub route_name: String,
    pub departure_port: String,
    pub arrival_port: String,
    pub duration: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ScheduleOut {
    pub id: String,
    pub departure_date: Option<String>,
    pub departure_time: String,
    pub arrival_time: String,
    pub status: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct BookingOut {
    pub id: String,
    pub booking_reference: String,
    pub user_id: String,
    pub passenger_name: String,
    pub passenger_email: Option<String>,
    pub passenger_phone: Option<String>,
    pub num_passengers: i32,
    pub passenger_type: String,
    pub departure_date: Option<String>,
    pub vehicle_type: Option<String>,
    pub vehicle_plate: Option<String>,
    pub cattle: i32,
    pub sheep_goats: i32,
    pub rice_bags: i32,
    pub groundnut_bags: i32,
    pub cement_bags: i32,
    pub cartons: i32,
    pub amount: i64,
    pub currency: String,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub booking_status: String,
    pub created_at: Option<String>,
    pub ferry: Option<FerryOut>,
    pub route: Option<RouteOut>,
    pub schedule: Option<ScheduleOut>,
}

#[derive(Debug, Serialize, Clone)]
pub struct PaymentOut {
    pub id: String,
    pub booking_id: String,
    pub user_id: String,
    pub amount: i64,
    pub currency: String,
    pub method: String,
    pub status: String,
    pub intent_id: Option<String>,
    pub payment_link: Option<String>,
    pub failure_reason: Option<String>,
    pub paid_at: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingCreateData {
    pub booking: BookingOut,
    pub payment: Option<PaymentOut>,
}

#[derive(Debug, Serialize)]
pub struct BookingCreateOut {
    pub success: bool,
    pub message: String,
    pub data: BookingCreateData,
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentReq {
    pub booking_id: String,
    pub amount: i64,
    pub method: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateReq {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct BookingListParams {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub search: Option<String>,
    pub date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BookingListOut {
    pub bookings: Vec<BookingOut>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentOut {
    pub status: String,
    pub gateway_status: Option<String>,
    pub paid_at: Option<String>,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct OkOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub env: String,
    pub service: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_parse_accepts_known_classes() {
        assert_eq!(
            VehicleSelection::parse(Some("Saloon Car"), None, None),
            Ok(VehicleSelection::Private(PrivateVehicle::SaloonCar))
        );
        assert_eq!(
            VehicleSelection::parse(Some("Commercial 21 to 35 PAX"), None, None),
            Ok(VehicleSelection::Commercial(CommercialClass::Pax21To35))
        );
        assert_eq!(
            VehicleSelection::parse(Some("Taxi Baggage (Empty)"), None, None),
            Ok(VehicleSelection::Commercial(CommercialClass::TaxiBaggageEmpty))
        );
        assert_eq!(
            VehicleSelection::parse(Some("none"), None, None),
            Ok(VehicleSelection::None)
        );
        assert_eq!(
            VehicleSelection::parse(None, None, None),
            Ok(VehicleSelection::None)
        );
    }

    #[test]
    fn vehicle_parse_rejects_unknown_type_instead_of_zero_pricing() {
        let err = VehicleSelection::parse(Some("Hovercraft"), None, None);
        assert_eq!(
            err,
            Err(VehicleParseError::UnknownType("Hovercraft".to_string()))
        );
    }

    #[test]
    fn foreign_vehicle_requires_dimensions() {
        assert_eq!(
            VehicleSelection::parse(Some("Foreign Vehicle"), Some(30.0), None),
            Err(VehicleParseError::MissingDimensions)
        );
        assert_eq!(
            VehicleSelection::parse(Some("Foreign Vehicle"), Some(30.0), Some(12.4)),
            Ok(VehicleSelection::Foreign {
                weight_tons: 30.0,
                length_meters: 12.4
            })
        );
    }

    #[test]
    fn vehicle_type_name_round_trips() {
        for raw in [
            "Motorcycle",
            "Dem Dikk (All Inclusive)",
            "Commercial 45 to Above",
            "Taxi Baggage (Empty)",
        ] {
            let parsed = VehicleSelection::parse(Some(raw), None, None).expect("parse");
            assert_eq!(parsed.type_name().as_deref(), Some(raw));
        }
    }

    #[test]
    fn status_enums_round_trip() {
        for s in ["Pending", "Confirmed", "Cancelled", "Completed"] {
            assert_eq!(BookingStatus::parse(s).map(BookingStatus::as_str), Some(s));
        }
        for s in ["Pending", "Paid", "Failed", "Refunded"] {
            assert_eq!(
                BookingPaymentStatus::parse(s).map(BookingPaymentStatus::as_str),
                Some(s)
            );
        }
        for s in ["pending", "successful", "failed", "cancelled"] {
            assert_eq!(PaymentState::parse(s).map(PaymentState::as_str), Some(s));
        }
        assert!(BookingStatus::parse("confirmed").is_none());
    }
}
