//! Field nutrient balance and the messages shown against it

use serde::Serialize;

use crate::catalog::{BalanceType, NutrientMessage};
use crate::models::Field;
use crate::types::NutrientTotals;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FieldBalance {
    pub available_nutrients: NutrientTotals,
    pub total_removal: NutrientTotals,
    /// Removal not covered by available nutrients; never negative
    pub nutrients_still_required: NutrientTotals,
}

/// Sum crop requirements plus one fertilizer's contribution, and crop removal
pub fn field_nutrient_balance(field: &Field, fertilizer: Option<NutrientTotals>) -> FieldBalance {
    let mut available = NutrientTotals::zero();
    let mut removal = NutrientTotals::zero();
    for crop in &field.crops {
        available += crop.balance.required();
        removal += crop.balance.removal();
    }
    if let Some(applied) = fertilizer {
        available += applied;
    }

    FieldBalance {
        available_nutrients: available,
        total_removal: removal,
        nutrients_still_required: removal.saturating_deficit(&available),
    }
}

/// First message whose band for this column contains `value`, bounds inclusive
pub fn find_balance_message(
    balance_type: BalanceType,
    value: f64,
    messages: &[NutrientMessage],
) -> Option<&NutrientMessage> {
    messages.iter().find(|msg| {
        if msg.balance_type != balance_type {
            return false;
        }
        let (low, high) = if balance_type.is_agronomic() {
            (msg.req_balance_low, msg.req_balance_high)
        } else {
            (msg.rem_balance_low, msg.rem_balance_high)
        };
        value >= low && value <= high
    })
}

/// Message text with `{0}` replaced by the magnitude of the balance, one decimal
pub fn format_balance_message(message: &NutrientMessage, value: f64) -> String {
    message.text.replace("{0}", &format!("{:.1}", value.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_nutrient_messages;
    use crate::models::{BalanceValues, Crop};

    fn field_with_crop() -> Field {
        let mut field = Field::new("Home", 10.0);
        field.crops.push(Crop {
            name: "Corn".to_string(),
            balance: BalanceValues {
                req_n: 50.0,
                req_p2o5: 20.0,
                req_k2o: 30.0,
                rem_n: 40.0,
                rem_p2o5: 15.0,
                rem_k2o: 25.0,
            },
            ..Default::default()
        });
        field
    }

    #[test]
    fn test_removal_covered_by_crop_requirements() {
        let balance = field_nutrient_balance(&field_with_crop(), None);
        assert_eq!(balance.available_nutrients, NutrientTotals::new(50.0, 20.0, 30.0));
        assert_eq!(balance.total_removal, NutrientTotals::new(40.0, 15.0, 25.0));
        assert_eq!(balance.nutrients_still_required, NutrientTotals::zero());
    }

    #[test]
    fn test_fertilizer_adds_to_available() {
        let mut field = field_with_crop();
        field.crops[0].balance.rem_n = 90.0;
        let balance = field_nutrient_balance(&field, Some(NutrientTotals::new(20.0, 0.0, 0.0)));
        assert_eq!(balance.available_nutrients.n, 70.0);
        assert_eq!(balance.nutrients_still_required.n, 20.0);
    }

    #[test]
    fn test_message_bands_inclusive() {
        let messages = default_nutrient_messages();
        assert_eq!(find_balance_message(BalanceType::ReqN, 14.0, &messages).map(|m| m.id), Some(2));
        assert_eq!(find_balance_message(BalanceType::ReqN, 15.0, &messages).map(|m| m.id), Some(1));
        assert_eq!(find_balance_message(BalanceType::ReqN, -6.0, &messages).map(|m| m.id), Some(3));
        // gap between -6 and -5
        assert!(find_balance_message(BalanceType::ReqN, -5.5, &messages).is_none());
    }

    #[test]
    fn test_removal_message_uses_rem_band() {
        let messages = default_nutrient_messages();
        assert!(find_balance_message(BalanceType::RemP2o5, 50.0, &messages).is_none());
        assert_eq!(
            find_balance_message(BalanceType::RemP2o5, 80.0, &messages).map(|m| m.id),
            Some(10)
        );
    }

    #[test]
    fn test_format_message() {
        let messages = default_nutrient_messages();
        let msg = find_balance_message(BalanceType::ReqN, -25.0, &messages).unwrap();
        assert_eq!(
            format_balance_message(msg, -25.0),
            "Add 25.0 lb N/ac to meet crop requirements"
        );
    }
}
