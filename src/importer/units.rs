pub const METERS_PER_FOOT: f64 = 0.3048;
pub const MPS_PER_MPH: f64 = 0.44704;

pub fn feet_to_meters(feet: f64) -> f64 {
    feet * METERS_PER_FOOT
}

pub fn mph_to_mps(mph: f64) -> f64 {
    mph * MPS_PER_MPH
}
