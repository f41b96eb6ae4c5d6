//! Line item output structures

use crate::catalog::LineCode;
use crate::types::{BranchId, Period};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Index};

/// One computed amount, the engine's unit of output
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, Deserialize)]
pub struct LineItemValue {
    pub branch_id: BranchId,
    pub period: Period,
    pub line_item_code: LineCode,
    pub amount: f64,
}

/// Amounts for every line item of one branch (or branch subset) and period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineItemValues {
    amounts: [f64; LineCode::COUNT],
}

impl LineItemValues {
    pub fn zero() -> Self {
        Self { amounts: [0.0; LineCode::COUNT] }
    }

    pub fn get(&self, code: LineCode) -> f64 {
        self.amounts[code.index()]
    }

    pub(crate) fn set(&mut self, code: LineCode, amount: f64) {
        self.amounts[code.index()] = amount;
    }

    /// Amounts in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = (LineCode, f64)> + '_ {
        LineCode::ALL.iter().map(move |code| (*code, self.get(*code)))
    }

    pub fn is_zero(&self) -> bool {
        self.amounts.iter().all(|amount| *amount == 0.0)
    }

    /// Copy rounded to `decimals` places, for display only
    pub fn rounded(&self, decimals: u32) -> Self {
        let mut rounded = *self;
        for amount in rounded.amounts.iter_mut() {
            *amount = round_to(*amount, decimals);
        }
        rounded
    }

    /// Flatten into individual values tagged with branch and period
    pub fn to_values(&self, branch_id: BranchId, period: Period) -> Vec<LineItemValue> {
        self.iter()
            .map(|(line_item_code, amount)| LineItemValue {
                branch_id,
                period,
                line_item_code,
                amount,
            })
            .collect()
    }
}

impl Default for LineItemValues {
    fn default() -> Self {
        Self::zero()
    }
}

impl Index<LineCode> for LineItemValues {
    type Output = f64;

    fn index(&self, code: LineCode) -> &f64 {
        &self.amounts[code.index()]
    }
}

impl AddAssign<&LineItemValues> for LineItemValues {
    fn add_assign(&mut self, other: &LineItemValues) {
        for (amount, addend) in self.amounts.iter_mut().zip(other.amounts.iter()) {
            *amount += addend;
        }
    }
}

impl Add for LineItemValues {
    type Output = LineItemValues;

    fn add(mut self, other: LineItemValues) -> LineItemValues {
        self += &other;
        self
    }
}

impl<'a> Sum<&'a LineItemValues> for LineItemValues {
    fn sum<I: Iterator<Item = &'a LineItemValues>>(iter: I) -> Self {
        iter.fold(LineItemValues::zero(), |mut acc, values| {
            acc += values;
            acc
        })
    }
}

impl Serialize for LineItemValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(LineCode::COUNT))?;
        for (code, amount) in self.iter() {
            map.serialize_entry(code.as_str(), &amount)?;
        }
        map.end()
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(amount: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (amount * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_is_element_wise() {
        let mut a = LineItemValues::zero();
        a.set(LineCode::RevIp, 10.0);
        a.set(LineCode::Zakat, 1.5);
        let mut b = LineItemValues::zero();
        b.set(LineCode::RevIp, 5.0);

        let total: LineItemValues = [a, b].iter().sum();
        assert_eq!(total[LineCode::RevIp], 15.0);
        assert_eq!(total[LineCode::Zakat], 1.5);
        assert_eq!((a + b)[LineCode::RevIp], 15.0);
    }

    #[test]
    fn test_rounding_for_display() {
        let mut values = LineItemValues::zero();
        values.set(LineCode::RevNet, 1234.5678);
        values.set(LineCode::Oci, -0.005);
        let rounded = values.rounded(2);
        assert_eq!(rounded[LineCode::RevNet], 1234.57);
        assert_eq!(rounded[LineCode::Oci], -0.01);
        // Source keeps full precision
        assert_eq!(values[LineCode::RevNet], 1234.5678);
    }

    #[test]
    fn test_serializes_as_code_map() {
        let mut values = LineItemValues::zero();
        values.set(LineCode::Ebitda, 42.0);
        let json = serde_json::to_value(values).unwrap();
        assert_eq!(json["EBITDA"], 42.0);
        assert_eq!(json.as_object().unwrap().len(), LineCode::COUNT);
    }

    #[test]
    fn test_flatten_to_values() {
        let values = LineItemValues::zero();
        let flat = values.to_values(3, Period(7));
        assert_eq!(flat.len(), LineCode::COUNT);
        assert_eq!(flat[0].line_item_code, LineCode::RevIp);
        assert!(flat.iter().all(|v| v.branch_id == 3 && v.period == Period(7)));
    }
}
