//! TMS5220 coding tables
//!
//! Static quantization tables transcribed from the TMS 5220 Voice Synthesis
//! Processor Data Manual. The analysis side quantizes gain, pitch, and the
//! ten reflector coefficients against these vectors; the synthesizer maps
//! the resulting indices back through the energy, pitch, and coefficient
//! tables and excites voiced frames with the chirp.

use crate::error::{CodecError, Result};

/// Number of reflector coefficients in an LPC-10 frame
pub const N_COEFFS: usize = 10;

/// Width of the gain (energy) field, in bits
pub const GAIN_BIT_WIDTH: usize = 4;

/// Width of the repeat flag, in bits
pub const REPEAT_BIT_WIDTH: usize = 1;

/// Width of the pitch field, in bits
pub const PITCH_BIT_WIDTH: usize = 6;

/// Width of each reflector-coefficient field, in bits
pub const COEFF_BIT_WIDTHS: [usize; N_COEFFS] = [5, 5, 4, 4, 4, 4, 4, 3, 3, 3];

/// Gain index reserved for the stop frame
pub const STOP_FRAME_GAIN_INDEX: usize = 0xF;

/// Total width of a silent frame, in bits
pub const SILENT_FRAME_BITS: usize = GAIN_BIT_WIDTH;

/// Total width of a repeat frame, in bits
pub const REPEAT_FRAME_BITS: usize = GAIN_BIT_WIDTH + REPEAT_BIT_WIDTH + PITCH_BIT_WIDTH;

/// Total width of an unvoiced non-repeat frame, in bits
pub const UNVOICED_FRAME_BITS: usize = REPEAT_FRAME_BITS + 5 + 5 + 4 + 4;

/// Total width of a voiced non-repeat frame, in bits
pub const VOICED_FRAME_BITS: usize = UNVOICED_FRAME_BITS + 4 + 4 + 4 + 3 + 3 + 3;

/// RMS (gain) table, indexed by the 4-bit energy field
pub static RMS: [f32; 16] = [
    0.0, 52.0, 87.0, 123.0, 174.0, 246.0, 348.0, 491.0, 694.0, 981.0, 1385.0, 1957.0, 2764.0,
    3904.0, 5514.0, 7789.0,
];

/// Pitch period table (in samples), indexed by the 6-bit pitch field
pub static PITCH: [f32; 64] = [
    0.0, 15.0, 16.0, 17.0, 18.0, 19.0, 20.0, 21.0, 22.0, 23.0, 24.0, 25.0, 26.0, 27.0, 28.0, 29.0,
    30.0, 31.0, 32.0, 33.0, 34.0, 35.0, 36.0, 37.0, 38.0, 39.0, 40.0, 41.0, 42.0, 44.0, 46.0,
    48.0, 50.0, 52.0, 53.0, 56.0, 58.0, 60.0, 62.0, 65.0, 68.0, 70.0, 72.0, 76.0, 78.0, 80.0,
    84.0, 86.0, 91.0, 94.0, 98.0, 101.0, 105.0, 109.0, 114.0, 118.0, 122.0, 127.0, 132.0, 137.0,
    142.0, 148.0, 153.0, 159.0,
];

/// First reflector-coefficient table (5 bits)
pub static K1: [f32; 32] = [
    -0.97850, -0.97270, -0.97070, -0.96680, -0.96290, -0.95900, -0.95310, -0.94140, -0.93360,
    -0.92580, -0.91600, -0.90620, -0.89650, -0.88280, -0.86910, -0.85350, -0.80420, -0.74058,
    -0.66019, -0.56116, -0.44296, -0.30706, -0.15735, -0.00005, 0.15725, 0.30696, 0.44288,
    0.56109, 0.66013, 0.74054, 0.80416, 0.85350,
];

/// Second reflector-coefficient table (5 bits)
pub static K2: [f32; 32] = [
    -0.64000, -0.58999, -0.53500, -0.47507, -0.41039, -0.34129, -0.26830, -0.19209, -0.11350,
    -0.03345, 0.04702, 0.12690, 0.20515, 0.28087, 0.35325, 0.42163, 0.48553, 0.54464, 0.59878,
    0.64796, 0.69227, 0.73190, 0.76714, 0.79828, 0.82567, 0.84965, 0.87057, 0.88875, 0.90451,
    0.91813, 0.92988, 0.98830,
];

/// Third reflector-coefficient table (4 bits)
pub static K3: [f32; 16] = [
    -0.86000, -0.75467, -0.64933, -0.54400, -0.43867, -0.33333, -0.22800, -0.12267, -0.01733,
    0.08800, 0.19333, 0.29867, 0.40400, 0.50933, 0.61467, 0.72000,
];

/// Fourth reflector-coefficient table (4 bits)
pub static K4: [f32; 16] = [
    -0.64000, -0.53145, -0.42289, -0.31434, -0.20579, -0.09723, 0.01132, 0.11987, 0.22843,
    0.33698, 0.44553, 0.55409, 0.66264, 0.77119, 0.87975, 0.98830,
];

/// Fifth reflector-coefficient table (4 bits)
pub static K5: [f32; 16] = [
    -0.64000, -0.54933, -0.45867, -0.36800, -0.27733, -0.18667, -0.09600, -0.00533, 0.08533,
    0.17600, 0.26667, 0.35733, 0.44800, 0.53867, 0.62933, 0.72000,
];

/// Sixth reflector-coefficient table (4 bits)
pub static K6: [f32; 16] = [
    -0.50000, -0.41333, -0.32667, -0.24000, -0.15333, -0.06667, 0.02000, 0.10667, 0.19333,
    0.28000, 0.36667, 0.45333, 0.54000, 0.62667, 0.71333, 0.80000,
];

/// Seventh reflector-coefficient table (4 bits)
pub static K7: [f32; 16] = [
    -0.60000, -0.50667, -0.41333, -0.32000, -0.22667, -0.13333, -0.04000, 0.05333, 0.14667,
    0.24000, 0.33333, 0.42667, 0.52000, 0.61333, 0.70667, 0.80000,
];

/// Eighth reflector-coefficient table (3 bits)
pub static K8: [f32; 8] = [
    -0.50000, -0.31429, -0.12857, 0.05714, 0.24286, 0.42857, 0.61429, 0.80000,
];

/// Ninth reflector-coefficient table (3 bits)
pub static K9: [f32; 8] = [
    -0.50000, -0.34286, -0.18571, 0.02857, 0.12857, 0.28571, 0.44286, 0.60000,
];

/// Tenth reflector-coefficient table (3 bits)
pub static K10: [f32; 8] = [
    -0.40000, -0.25714, -0.11429, 0.02857, 0.17143, 0.31429, 0.45714, 0.60000,
];

/// Chirp: the deterministic excitation pulse for voiced frames
pub static CHIRP: [f32; 41] = [
    0.0, 0.328125, -0.34375, 0.390625, -0.609375, 0.140625, 0.2890625, 0.15625, 0.015625,
    -0.2421875, -0.4609375, 0.015625, 0.7421875, 0.703125, 0.0390625, 0.1171875, 0.296875,
    -0.03125, -0.7109375, -0.7109375, -0.328125, -0.2734375, -0.28125, -0.03125, 0.2890625,
    0.3359375, 0.265625, 0.2578125, 0.1171875, -0.0078125, -0.0625, -0.140625, -0.1484375,
    -0.1328125, -0.0703125, -0.078125, -0.046875, 0.0, 0.0234375, 0.015625, 0.0078125,
];

/// Energy table used by the synthesizer, indexed by the 4-bit energy field
pub static ENERGY: [f32; 16] = [
    0.0, 0.00390625, 0.005859375, 0.0078125, 0.009765625, 0.013671875, 0.01953125, 0.029296875,
    0.0390625, 0.0625, 0.080078125, 0.111328125, 0.158203125, 0.22265625, 0.314453125, 0.0,
];

/// Reflector-coefficient tables in stage order
pub static K_TABLES: [&[f32]; N_COEFFS] = [
    &K1, &K2, &K3, &K4, &K5, &K6, &K7, &K8, &K9, &K10,
];

/// Gets the ith reflector-coefficient table
///
/// # Errors
///
/// Returns [`CodecError::IndexOutOfRange`] if `i >= 10`
pub fn coeff_table(i: usize) -> Result<&'static [f32]> {
    K_TABLES
        .get(i)
        .copied()
        .ok_or_else(|| CodecError::index_out_of_range(i, N_COEFFS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes_match_bit_widths() {
        for (i, &width) in COEFF_BIT_WIDTHS.iter().enumerate() {
            let table = coeff_table(i).unwrap();
            assert_eq!(table.len(), 1 << width, "table k{} size", i + 1);
        }

        assert_eq!(RMS.len(), 1 << GAIN_BIT_WIDTH);
        assert_eq!(PITCH.len(), 1 << PITCH_BIT_WIDTH);
    }

    #[test]
    fn test_frame_widths() {
        assert_eq!(SILENT_FRAME_BITS, 4);
        assert_eq!(REPEAT_FRAME_BITS, 11);
        assert_eq!(UNVOICED_FRAME_BITS, 29);
        assert_eq!(VOICED_FRAME_BITS, 50);
    }

    #[test]
    fn test_coeff_table_out_of_range() {
        assert!(coeff_table(10).is_err());
    }

    #[test]
    fn test_tables_are_monotonic() {
        // Quantization by nearest entry relies on sorted tables
        for i in 0..N_COEFFS {
            let table = coeff_table(i).unwrap();
            for pair in table.windows(2) {
                assert!(pair[0] < pair[1], "k{} not ascending", i + 1);
            }
        }

        for pair in RMS.windows(2) {
            assert!(pair[0] < pair[1]);
        }

        for pair in PITCH.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
