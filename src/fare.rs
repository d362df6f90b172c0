use crate::models::{CommercialClass, PassengerType, VehicleSelection};
use crate::tariffs;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareLine {
    pub label: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareBreakdown {
    pub lines: Vec<FareLine>,
    /// Total in the base currency (GMD).
    pub total: i64,
    /// Total converted into the secondary currency (CFA) at the fixed rate.
    pub total_secondary: i64,
}

/// Validated line items of one booking request. Counts are already known to
/// be non-negative and the vehicle selection is a closed enum, so pricing
/// never fails and never touches storage.
#[derive(Debug, Clone)]
pub struct FareRequest {
    pub passenger_type: PassengerType,
    pub num_passengers: i32,
    pub vehicle: VehicleSelection,
    pub cattle: i32,
    pub sheep_goats: i32,
    pub rice_bags: i32,
    pub groundnut_bags: i32,
    pub cement_bags: i32,
    pub cartons: i32,
}

pub fn calculate_fare(req: &FareRequest, conversion_rate: i64) -> FareBreakdown {
    let mut lines: Vec<FareLine> = Vec::new();

    match req.passenger_type {
        // Flat rate, rider included, regardless of the passenger count.
        PassengerType::Bicycle => lines.push(FareLine {
            label: "Bicycle (including rider)".to_string(),
            amount: tariffs::BICYCLE_INCLUDING_RIDER,
        }),
        PassengerType::Vip => lines.push(FareLine {
            label: format!("VIP Passengers ({})", req.num_passengers),
            amount: tariffs::VIP_PASSENGER * i64::from(req.num_passengers),
        }),
        PassengerType::Economy => lines.push(FareLine {
            label: format!("Economy Passengers ({})", req.num_passengers),
            amount: tariffs::ECONOMY_PASSENGER * i64::from(req.num_passengers),
        }),
    }

    match &req.vehicle {
        VehicleSelection::None => {}
        VehicleSelection::Private(v) => lines.push(FareLine {
            label: v.as_str().to_string(),
            amount: tariffs::private_vehicle_fare(*v),
        }),
        VehicleSelection::Commercial(c) => {
            let label = if *c == CommercialClass::TaxiBaggageEmpty {
                c.as_str().to_string()
            } else {
                format!("Commercial Vehicle ({})", c.as_str())
            };
            lines.push(FareLine {
                label,
                amount: tariffs::commercial_vehicle_fare(*c),
            });
        }
        VehicleSelection::Foreign {
            weight_tons,
            length_meters,
        } => lines.push(FareLine {
            label: format!("Foreign Vehicle ({weight_tons}t x {length_meters}m)"),
            amount: tariffs::foreign_vehicle_fare(*weight_tons, *length_meters),
        }),
    }

    if req.cattle > 0 {
        lines.push(FareLine {
            label: format!("Cattle ({} head)", req.cattle),
            amount: tariffs::CATTLE_PER_HEAD * i64::from(req.cattle),
        });
    }
    if req.sheep_goats > 0 {
        lines.push(FareLine {
            label: format!("Sheep/Goats ({} head)", req.sheep_goats),
            amount: tariffs::SHEEP_GOAT_PER_HEAD * i64::from(req.sheep_goats),
        });
    }

    let bags = req.rice_bags + req.groundnut_bags + req.cement_bags;
    if bags > 0 {
        lines.push(FareLine {
            label: format!("Rice/Groundnut/Cement ({bags} bags)"),
            amount: tariffs::BAG_50KG * i64::from(bags),
        });
    }
    if req.cartons > 0 {
        lines.push(FareLine {
            label: format!("Cartons ({})", req.cartons),
            amount: tariffs::CARTON_MEDIUM * i64::from(req.cartons),
        });
    }

    let total: i64 = lines.iter().map(|l| l.amount).sum();
    FareBreakdown {
        lines,
        total,
        total_secondary: total * conversion_rate,
    }
}
