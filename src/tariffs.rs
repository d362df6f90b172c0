use crate::models::{CommercialClass, PassengerType, PrivateVehicle};

// Official Gambia Ferry Services tariff schedule, Banjul/Barra crossing,
// effective 10th July 2025. All prices in whole GMD.

pub const ECONOMY_PASSENGER: i64 = 65;
pub const VIP_PASSENGER: i64 = 625;
// Flat, including the rider.
pub const BICYCLE_INCLUDING_RIDER: i64 = 125;

pub const CATTLE_PER_HEAD: i64 = 250;
pub const SHEEP_GOAT_PER_HEAD: i64 = 200;

// Rice, groundnut and cement 50kg bags share one rate.
pub const BAG_50KG: i64 = 65;
pub const CARTON_MEDIUM: i64 = 125;

pub fn passenger_fare(class: PassengerType) -> i64 {
    match class {
        PassengerType::Economy => ECONOMY_PASSENGER,
        PassengerType::Vip => VIP_PASSENGER,
        PassengerType::Bicycle => BICYCLE_INCLUDING_RIDER,
    }
}

pub fn private_vehicle_fare(vehicle: PrivateVehicle) -> i64 {
    match vehicle {
        PrivateVehicle::Motorcycle => 250,
        PrivateVehicle::SaloonCar => 1250,
        PrivateVehicle::CarAndTrailer => 2500,
        PrivateVehicle::TractorHead => 1250,
        PrivateVehicle::TractorAndTrailer => 2500,
        PrivateVehicle::PremiumPriorityPass => 3000,
        PrivateVehicle::PriorityPassPerishable => 3000,
        PrivateVehicle::DemDikk => 8600,
    }
}

pub fn commercial_vehicle_fare(class: CommercialClass) -> i64 {
    match class {
        CommercialClass::Pax1To14 => 1250,
        CommercialClass::Pax15To20 => 1900,
        CommercialClass::Pax21To35 => 2500,
        CommercialClass::Pax36To44MiniVan => 4350,
        CommercialClass::Pax45AndAbove => 5000,
        CommercialClass::TaxiBaggageEmpty => 2500,
    }
}

const LENGTH_MIN_METERS: f64 = 10.0;
const LENGTH_MAX_METERS: f64 = 18.0;

// Foreign-vehicle weight matrix. Rows are weight bands keyed by the minimum
// weight (tons) of the band; columns are lengths 10..=18 meters. The bands
// below 13t are single tons apart from the opening 5-8 band, 13-20 is one
// band, and everything from 21t is per ton with 65 acting as 65+.
const FOREIGN_VEHICLE_MATRIX: [(u32, [i64; 9]); 51] = [
    (5, [2500, 2675, 2850, 3025, 3200, 3375, 3550, 3725, 3900]),
    (9, [2680, 2855, 3040, 3215, 3390, 3565, 3740, 3915, 4090]),
    (10, [2880, 3055, 3230, 3405, 3580, 3755, 3930, 4105, 4280]),
    (11, [3070, 3245, 3420, 3595, 3770, 3945, 4120, 4295, 4470]),
    (12, [3260, 3435, 3610, 3785, 3960, 4135, 4310, 4485, 4660]),
    (13, [3750, 3925, 4100, 4275, 4450, 4625, 4800, 4975, 5150]),
    (21, [3925, 4100, 4275, 4450, 4625, 4800, 4975, 5150, 5325]),
    (22, [4100, 4275, 4450, 4625, 4800, 4975, 5150, 5325, 5500]),
    (23, [4275, 4450, 4625, 4800, 4975, 5150, 5325, 5500, 5675]),
    (24, [4450, 4625, 4800, 4975, 5150, 5325, 5500, 5675, 5850]),
    (25, [4625, 4800, 4975, 5150, 5325, 5500, 5675, 5850, 6025]),
    (26, [4800, 4975, 5150, 5325, 5500, 5675, 5850, 6025, 6200]),
    (27, [4975, 5150, 5325, 5500, 5675, 5850, 6025, 6200, 6375]),
    (28, [5150, 5325, 5500, 5675, 5850, 6025, 6200, 6375, 6550]),
    (29, [5325, 5500, 5675, 5850, 6025, 6200, 6375, 6550, 6725]),
    (30, [5500, 5675, 5850, 6025, 6200, 6375, 6550, 6725, 6900]),
    (31, [5675, 5850, 6025, 6200, 6375, 6550, 6725, 6900, 7075]),
    (32, [5850, 6025, 6200, 6375, 6550, 6725, 6900, 7075, 7250]),
    (33, [6025, 6200, 6375, 6550, 6725, 6900, 7075, 7250, 7425]),
    (34, [6200, 6375, 6550, 6725, 6900, 7075, 7250, 7425, 7600]),
    (35, [6375, 6550, 6725, 6900, 7075, 7250, 7425, 7600, 7775]),
    (36, [6550, 6725, 6900, 7075, 7250, 7425, 7600, 7775, 7950]),
    (37, [6725, 6900, 7075, 7250, 7425, 7600, 7775, 7950, 8125]),
    (38, [6900, 7075, 7250, 7425, 7600, 7775, 7950, 8125, 8300]),
    (39, [7075, 7250, 7425, 7600, 7775, 7950, 8125, 8300, 8475]),
    (40, [7250, 7425, 7600, 7775, 7950, 8125, 8300, 8475, 8650]),
    (41, [7425, 7600, 7775, 7950, 8125, 8300, 8475, 8650, 8825]),
    (42, [7600, 7775, 7950, 8125, 8300, 8475, 8650, 8825, 9000]),
    (43, [7775, 7950, 8125, 8300, 8475, 8650, 8825, 9000, 9175]),
    (44, [7950, 8125, 8300, 8475, 8650, 8825, 9000, 9175, 9350]),
    (45, [8125, 8300, 8475, 8650, 8825, 9000, 9175, 9350, 9525]),
    (46, [8300, 8475, 8650, 8825, 9000, 9175, 9350, 9525, 9700]),
    (47, [8475, 8650, 8825, 9000, 9175, 9350, 9525, 9700, 9875]),
    (48, [8650, 8825, 9000, 9175, 9350, 9525, 9700, 9875, 10050]),
    (49, [8825, 9000, 9175, 9350, 9525, 9700, 9875, 10050, 10225]),
    (50, [9000, 9175, 9350, 9525, 9700, 9875, 10050, 10225, 10400]),
    (51, [9175, 9350, 9525, 9700, 9875, 10050, 10225, 10400, 10575]),
    (52, [9350, 9525, 9700, 9875, 10050, 10225, 10400, 10575, 10750]),
    (53, [9525, 9700, 9875, 10050, 10225, 10400, 10575, 10750, 10925]),
    (54, [9700, 9875, 10050, 10225, 10400, 10575, 10750, 10925, 11100]),
    (55, [9875, 10050, 10225, 10400, 10575, 10750, 10925, 11100, 11275]),
    (56, [10050, 10225, 10400, 10575, 10750, 10925, 11100, 11275, 11450]),
    (57, [10225, 10400, 10575, 10750, 10925, 11100, 11275, 11450, 11625]),
    (58, [10400, 10575, 10750, 10925, 11100, 11275, 11450, 11625, 11800]),
    (59, [10575, 10750, 10925, 11100, 11275, 11450, 11625, 11800, 11975]),
    (60, [10750, 10925, 11100, 11275, 11450, 11625, 11800, 11975, 12150]),
    (61, [10925, 11100, 11275, 11450, 11625, 11800, 11975, 12150, 12325]),
    (62, [11100, 11275, 11450, 11625, 11800, 11975, 12150, 12325, 12500]),
    (63, [11275, 11450, 11625, 11800, 11975, 12150, 12325, 12500, 12675]),
    (64, [11450, 11625, 11800, 11975, 12150, 12325, 12500, 12675, 12850]),
    (65, [11625, 11800, 11975, 12150, 12325, 12500, 12675, 12850, 13025]),
];

/// Weight buckets to the highest band the vehicle meets or exceeds (anything
/// lighter than 9t lands in the opening 5-8 band); length rounds to the
/// nearest meter and clamps to the tabulated 10-18m range.
pub fn foreign_vehicle_fare(weight_tons: f64, length_meters: f64) -> i64 {
    let mut prices = &FOREIGN_VEHICLE_MATRIX[0].1;
    for (min_weight, row) in FOREIGN_VEHICLE_MATRIX.iter() {
        if weight_tons >= f64::from(*min_weight) {
            prices = row;
        } else {
            break;
        }
    }
    let length = length_meters
        .round()
        .clamp(LENGTH_MIN_METERS, LENGTH_MAX_METERS) as usize;
    prices[length - LENGTH_MIN_METERS as usize]
}
