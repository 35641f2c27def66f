//! tables.rs
//! Recorded lap data for the replay engine.
//!
//! Two compiled-in tables, both sorted strictly ascending by elapsed lap
//! time: the standing-start lap (launch from rest) and the flying lap
//! reused for every lap after the first. Throttle values are in the
//! scaled 8-bit output range. The first entry of a table does not have to
//! start at zero elapsed time.

/// One point of a recorded lap trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapPoint {
    pub elapsed_ms: u32,
    pub throttle: u16,
}

const fn point(elapsed_ms: u32, throttle: u16) -> LapPoint {
    LapPoint {
        elapsed_ms,
        throttle,
    }
}

/// Standing-start lap: launch, two hairpins, back straight, chicane.
/// Total lap time 62.0 s.
pub const STANDING_START: &[LapPoint] = &[
    point(0, 0),
    point(400, 64),
    point(900, 140),
    point(1600, 210),
    point(2800, 248),
    point(5200, 255),
    point(7600, 232),
    point(9100, 120),
    point(10400, 38),
    point(11600, 0),
    point(12900, 55),
    point(14300, 162),
    point(16800, 236),
    point(19500, 255),
    point(22100, 201),
    point(23800, 96),
    point(25200, 20),
    point(26700, 74),
    point(28600, 188),
    point(31400, 247),
    point(34900, 255),
    point(38200, 255),
    point(40600, 174),
    point(42300, 61),
    point(43800, 0),
    point(45100, 47),
    point(46900, 152),
    point(49300, 229),
    point(52000, 255),
    point(54600, 216),
    point(56400, 128),
    point(57900, 52),
    point(59300, 107),
    point(60700, 190),
    point(62000, 226),
];

/// Flying lap: crosses the line under power, same circuit without the
/// launch phase. Total lap time 58.4 s.
pub const FLYING_LAP: &[LapPoint] = &[
    point(300, 226),
    point(1700, 255),
    point(4100, 238),
    point(5700, 124),
    point(7000, 41),
    point(8300, 0),
    point(9500, 58),
    point(10900, 167),
    point(13300, 239),
    point(15900, 255),
    point(18400, 205),
    point(20100, 99),
    point(21500, 23),
    point(23000, 78),
    point(24900, 191),
    point(27600, 249),
    point(31000, 255),
    point(34200, 255),
    point(36500, 178),
    point(38200, 64),
    point(39700, 0),
    point(41000, 50),
    point(42800, 155),
    point(45100, 231),
    point(47800, 255),
    point(50300, 219),
    point(52100, 131),
    point(53600, 55),
    point(55000, 110),
    point(56400, 192),
    point(58400, 228),
];
