//! 膠印版輥模數匹配
//!
//! 以袋寬推算單拼長度範圍，在版輥對照表中找出落在範圍內的格子，
//! 再依款數挑選最合適的模數。

use quote_core::{ModulusMatch, Size};
use rust_decimal::Decimal;

/// 版輥周長（千分之一 mm）
const ROLLER_PERIMETERS: [i64; 6] = [507_500, 532_900, 558_300, 609_100, 634_500, 685_300];

/// 版輥對照表：每列為模數，每欄為該周長下的單拼長度（千分之一 mm）
const ROLLER_TABLE: [(u32, [i64; 6]); 14] = [
    (15, [33_833, 35_527, 37_220, 40_607, 42_300, 45_687]),
    (14, [36_250, 38_064, 39_879, 43_507, 45_321, 48_950]),
    (13, [39_038, 40_992, 42_946, 46_854, 48_808, 52_715]),
    (12, [42_292, 44_408, 46_525, 50_758, 52_875, 57_108]),
    (11, [46_136, 48_445, 50_755, 55_373, 57_682, 62_300]),
    (10, [50_750, 53_290, 55_830, 60_910, 63_450, 68_530]),
    (9, [56_389, 59_211, 62_033, 67_678, 70_500, 76_144]),
    (8, [63_438, 66_613, 69_788, 76_138, 79_313, 85_663]),
    (7, [72_500, 76_129, 79_757, 87_014, 90_643, 97_900]),
    (6, [84_583, 88_817, 93_050, 101_517, 105_750, 114_217]),
    (5, [101_500, 106_580, 111_660, 121_820, 126_900, 137_060]),
    (4, [126_875, 133_225, 139_575, 152_275, 158_625, 171_325]),
    (3, [169_167, 177_633, 186_100, 203_033, 211_500, 228_433]),
    (2, [253_750, 266_450, 279_150, 304_550, 317_250, 342_650]),
];

/// 對照表中的一個候選格子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollerCandidate {
    pub modulus: u32,
    pub perimeter: Decimal,
    pub value: Decimal,
}

impl RollerCandidate {
    pub fn new(modulus: u32, perimeter: Decimal, value: Decimal) -> Self {
        Self {
            modulus,
            perimeter,
            value,
        }
    }
}

impl From<RollerCandidate> for ModulusMatch {
    fn from(candidate: RollerCandidate) -> Self {
        ModulusMatch::new(candidate.modulus, candidate.perimeter, candidate.value)
    }
}

/// 版輥對照表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollerTable {
    perimeters: Vec<Decimal>,
    rows: Vec<(u32, Vec<Decimal>)>,
}

impl RollerTable {
    /// 標準對照表
    pub fn canonical() -> Self {
        let perimeters = ROLLER_PERIMETERS
            .iter()
            .map(|p| Decimal::new(*p, 3))
            .collect();
        let rows = ROLLER_TABLE
            .iter()
            .map(|(modulus, values)| {
                (
                    *modulus,
                    values.iter().map(|v| Decimal::new(*v, 3)).collect(),
                )
            })
            .collect();
        Self { perimeters, rows }
    }

    /// 自訂對照表；每列長度必須與周長數相同
    pub fn new(perimeters: Vec<Decimal>, rows: Vec<(u32, Vec<Decimal>)>) -> quote_core::Result<Self> {
        if let Some((modulus, _)) = rows.iter().find(|(_, values)| values.len() != perimeters.len()) {
            return Err(quote_core::QuoteError::InvalidConfig(format!(
                "版輥對照表模數 {} 的欄數與周長數 {} 不符",
                modulus,
                perimeters.len()
            )));
        }
        Ok(Self { perimeters, rows })
    }

    /// 依掃描順序（列由上而下、欄由左而右）列出落在範圍內的格子
    pub fn candidates_within(&self, min: Decimal, max: Decimal) -> Vec<RollerCandidate> {
        let perimeters = &self.perimeters;
        self.rows
            .iter()
            .flat_map(move |(modulus, values)| {
                values
                    .iter()
                    .zip(perimeters.iter())
                    .filter(move |(value, _)| **value >= min && **value <= max)
                    .map(move |(value, perimeter)| RollerCandidate::new(*modulus, *perimeter, *value))
            })
            .collect()
    }
}

impl Default for RollerTable {
    fn default() -> Self {
        Self::canonical()
    }
}

/// 由袋寬推算單拼長度範圍（mm）
///
/// 一般袋型為 [寬 + 5, 寬 + 15]，異形袋為 [寬 + 10, 寬 + 20]。
pub fn printing_length_range(width: Decimal, custom_shaped: bool) -> (Decimal, Decimal) {
    if custom_shaped {
        (width + Decimal::from(10), width + Decimal::from(20))
    } else {
        (width + Decimal::from(5), width + Decimal::from(15))
    }
}

/// 依款數在候選格子中挑選模數
///
/// 1. 全部模數大於款數：取能被款數整除的模數中單拼長度最小者
/// 2. 有模數恰等於款數：取第一個
/// 3. 全部模數小於款數：能整除款數者中取倍數最小者；都不能整除時取
///    款數 ÷ 模數（取整）最小者，再取單拼長度最小者
/// 4. 其他情況取單拼長度最小者
pub fn select_candidate(candidates: &[RollerCandidate], num_of_styles: u32) -> Option<RollerCandidate> {
    if candidates.is_empty() {
        return None;
    }
    let n = num_of_styles.max(1);

    if candidates.iter().all(|c| c.modulus > n) {
        let divisible = candidates.iter().filter(|c| c.modulus % n == 0);
        if let Some(found) = shortest(divisible) {
            return Some(found);
        }
    }

    if let Some(exact) = candidates.iter().find(|c| c.modulus == n) {
        return Some(*exact);
    }

    if candidates.iter().all(|c| c.modulus < n) {
        let divisors: Vec<&RollerCandidate> = candidates
            .iter()
            .filter(|c| c.modulus > 0 && n % c.modulus == 0)
            .collect();

        if !divisors.is_empty() {
            // n / m 越小即 m 越大；同模數時保留掃描順序中的第一個
            return divisors
                .into_iter()
                .min_by(|a, b| b.modulus.cmp(&a.modulus))
                .copied();
        }

        let quotient = |c: &RollerCandidate| n / c.modulus.max(1);
        let min_quotient = candidates.iter().map(|c| quotient(c)).min()?;
        let nearest = candidates.iter().filter(|c| quotient(*c) == min_quotient);
        return shortest(nearest);
    }

    shortest(candidates.iter())
}

/// 單拼長度最短者；相同時取第一個
fn shortest<'a>(candidates: impl Iterator<Item = &'a RollerCandidate>) -> Option<RollerCandidate> {
    candidates.min_by(|a, b| a.value.cmp(&b.value)).copied()
}

/// 模數解析器
#[derive(Debug, Clone, Default)]
pub struct ModulusResolver {
    table: RollerTable,
}

impl ModulusResolver {
    /// 使用標準對照表
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用自訂對照表
    pub fn with_table(table: RollerTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RollerTable {
        &self.table
    }

    /// 解析模數；對照表未命中時返回退化結果（模數 1、周長 0）
    pub fn resolve(&self, size: &Size, num_of_styles: u32, custom_shaped: bool) -> ModulusMatch {
        let (min, max) = printing_length_range(size.width, custom_shaped);
        let candidates = self.table.candidates_within(min, max);

        tracing::debug!(
            "模數匹配：袋寬 {}mm，範圍 [{}, {}]，候選 {} 個，款數 {}",
            size.width,
            min,
            max,
            candidates.len(),
            num_of_styles
        );

        match select_candidate(&candidates, num_of_styles) {
            Some(candidate) => candidate.into(),
            None => {
                tracing::warn!(
                    "版輥對照表中沒有單拼長度落在 [{}, {}] 的格子，改用模數 1",
                    min,
                    max
                );
                ModulusMatch::unmatched()
            }
        }
    }
}
