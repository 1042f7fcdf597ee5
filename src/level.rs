use serde::Serialize;

/// Guide lines drawn across congestion charts.
pub const REFERENCE_THRESHOLDS: [f64; 3] = [30.0, 60.0, 100.0];

/// Named congestion band for a single reading.
///
/// | Range       | Level      |
/// |-------------|------------|
/// | >= 100      | 매우 혼잡  |
/// | >= 60       | 보통 혼잡  |
/// | >= 30       | 여유       |
/// | >= 0        | 매우 여유  |
/// | < 0         | 알 수 없음 |
/// | missing     | 데이터 없음 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CongestionLevel {
    VeryRelaxed,
    Relaxed,
    Moderate,
    VeryCrowded,
    Unknown,
    NoData,
}

impl CongestionLevel {
    pub fn of(congestion: Option<f64>) -> Self {
        match congestion {
            None => CongestionLevel::NoData,
            Some(c) if c >= 100.0 => CongestionLevel::VeryCrowded,
            Some(c) if c >= 60.0 => CongestionLevel::Moderate,
            Some(c) if c >= 30.0 => CongestionLevel::Relaxed,
            Some(c) if c >= 0.0 => CongestionLevel::VeryRelaxed,
            Some(_) => CongestionLevel::Unknown,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CongestionLevel::VeryRelaxed => "매우 여유",
            CongestionLevel::Relaxed => "여유",
            CongestionLevel::Moderate => "보통 혼잡",
            CongestionLevel::VeryCrowded => "매우 혼잡",
            CongestionLevel::Unknown => "알 수 없음",
            CongestionLevel::NoData => "데이터 없음",
        }
    }

    pub const fn emoji(self) -> &'static str {
        match self {
            CongestionLevel::VeryRelaxed => "🔵",
            CongestionLevel::Relaxed => "🟢",
            CongestionLevel::Moderate => "🟡",
            CongestionLevel::VeryCrowded => "🔴",
            CongestionLevel::Unknown | CongestionLevel::NoData => "⚪",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            CongestionLevel::VeryRelaxed => "#3498db",
            CongestionLevel::Relaxed => "#2ecc71",
            CongestionLevel::Moderate => "#f1c40f",
            CongestionLevel::VeryCrowded => "#e74c3c",
            CongestionLevel::Unknown | CongestionLevel::NoData => "#95a5a6",
        }
    }
}
