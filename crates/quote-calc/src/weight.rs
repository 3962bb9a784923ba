//! 出貨重量估算

use quote_core::{BagShape, Case, Size, WeightRates};
use rust_decimal::Decimal;

use crate::selection::OptionSelection;

/// 重量估算器
pub struct WeightEstimator;

impl WeightEstimator {
    /// 估算所有批次的重量（kg）；無法辨識的袋型為 None
    pub fn estimate_all(
        size: &Size,
        shape: &BagShape,
        cases: &[Case],
        selection: &OptionSelection<'_>,
        rates: &WeightRates,
    ) -> Vec<Option<Decimal>> {
        let surface_density = selection.surface_density();
        cases
            .iter()
            .map(|case| Self::estimate(size, shape, case.total_quantity, surface_density, rates))
            .collect()
    }

    /// 估算單一批次
    ///
    /// 膜重 = 面密度 / 換算除數 × 數量 × 展開面積，再加上配件與紙箱重量。
    pub fn estimate(
        size: &Size,
        shape: &BagShape,
        total_quantity: u64,
        surface_density: Decimal,
        rates: &WeightRates,
    ) -> Option<Decimal> {
        let quantity = Decimal::from(total_quantity);
        let unfolded_area = size.width * size.height * Decimal::from(2);
        let film = surface_density / rates.density_divisor * quantity * unfolded_area
            / Decimal::from(100)
            / Decimal::from(1000);

        let cartons = |units_per_carton: u64| Decimal::from(total_quantity.div_ceil(units_per_carton.max(1)));

        let weight = match shape {
            BagShape::ThreeSideSeal => {
                film + quantity * rates.accessory_weight_per_piece + cartons(rates.units_per_carton)
            }
            BagShape::StandUp
            | BagShape::FinSeal
            | BagShape::FinSealGusset
            | BagShape::FourSideSeal
            | BagShape::FlatBottom
            | BagShape::SquareBottom
            | BagShape::BagInBox
            | BagShape::Film => {
                film * rates.structural_multiplier
                    + quantity * rates.accessory_weight_per_piece
                    + cartons(rates.units_per_carton)
            }
            BagShape::Spout => {
                film * rates.structural_multiplier
                    + quantity * rates.spout_accessory_weight_per_piece
                    + cartons(rates.spout_units_per_carton)
            }
            BagShape::Other(name) => {
                tracing::debug!("無法估算袋型「{}」的重量", name);
                return None;
            }
        };

        Some(weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_core::{MaterialLayers, MaterialOption, MaterialSuboption, SelectableOption};
    use rstest::rstest;

    fn size() -> Size {
        Size::new(Decimal::from(150), Decimal::from(200))
    }

    #[rstest]
    #[case("3 Side Seal Bag", Some(Decimal::new(5008, 3)))]
    #[case("Stand-Up Bag", Some(Decimal::new(5_221_696, 6)))]
    #[case("Bag In Box", Some(Decimal::new(5_221_696, 6)))]
    #[case("Spout Bag", Some(Decimal::new(6_821_696, 6)))]
    #[case("Shrink Sleeve", None)]
    fn test_estimate_by_shape(#[case] shape: &str, #[case] expected: Option<Decimal>) {
        let rates = WeightRates::default();
        // PET 1.4 × 12
        let surface_density = Decimal::new(168, 1);

        let weight = WeightEstimator::estimate(&size(), &BagShape::parse(shape), 1000, surface_density, &rates);
        assert_eq!(weight, expected);
    }

    #[test]
    fn test_estimate_all_uses_selected_materials() {
        let pet = MaterialSuboption::new(1, "PET", Decimal::new(14, 1), Decimal::from(12), Decimal::new(15, 1));
        let options = vec![SelectableOption::Material(
            MaterialOption::new(1, "Layer Material")
                .with_layers(MaterialLayers::new().with_selection(0, pet).unwrap()),
        )];
        let selection = OptionSelection::new(&options);
        let cases = vec![Case::new(1, 1000), Case::new(2, 1000)];

        let weights = WeightEstimator::estimate_all(
            &size(),
            &BagShape::ThreeSideSeal,
            &cases,
            &selection,
            &WeightRates::default(),
        );

        assert_eq!(weights.len(), 2);
        assert_eq!(weights[0], Some(Decimal::new(5008, 3)));
        // 2000 個：2.016 + 6 + 1
        assert_eq!(weights[1], Some(Decimal::new(9016, 3)));
    }
}
