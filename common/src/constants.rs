/// Number of coordinates of a 3-axis measurement
pub const N_XYZ_COORDINATES: usize = 3;
