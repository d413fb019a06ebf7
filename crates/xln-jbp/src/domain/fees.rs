//! Fee preset resolution (spec §4.4 "Broadcast": presets scale an
//! adapter-suggested base fee by `{1.0x, 1.2x, 1.5x}`; custom supplies
//! explicit values).

use shared_types::{Amount, FeePreset};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeData {
    pub max_fee_per_gas: Amount,
    pub max_priority_fee_per_gas: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeOverrides {
    pub max_fee_per_gas: Amount,
    pub max_priority_fee_per_gas: Amount,
}

pub fn resolve(preset: &FeePreset, base: &FeeData) -> FeeOverrides {
    match preset {
        FeePreset::Custom {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => FeeOverrides {
            max_fee_per_gas: max_fee_per_gas.clone(),
            max_priority_fee_per_gas: max_priority_fee_per_gas.clone(),
        },
        _ => {
            let bps = preset.multiplier_bps().expect("non-custom presets carry a multiplier");
            FeeOverrides {
                max_fee_per_gas: scale(&base.max_fee_per_gas, bps),
                max_priority_fee_per_gas: scale(&base.max_priority_fee_per_gas, bps),
            }
        }
    }
}

fn scale(amount: &Amount, bps: u32) -> Amount {
    (amount * &Amount::from(bps as i64)) / Amount::from(10_000i64)
}

/// `j_rebroadcast{gasBumpBps}`: bumps the last fee data by the given basis
/// points rather than re-resolving a preset (spec §4.4).
pub fn resolve_bump(base: &FeeData, gas_bump_bps: u32) -> FeeOverrides {
    let bps = 10_000 + gas_bump_bps;
    FeeOverrides {
        max_fee_per_gas: scale(&base.max_fee_per_gas, bps),
        max_priority_fee_per_gas: scale(&base.max_priority_fee_per_gas, bps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> FeeData {
        FeeData {
            max_fee_per_gas: Amount::from(100i64),
            max_priority_fee_per_gas: Amount::from(10i64),
        }
    }

    #[test]
    fn standard_preset_passes_base_through_unscaled() {
        let r = resolve(&FeePreset::Standard, &base());
        assert_eq!(r.max_fee_per_gas, Amount::from(100i64));
    }

    #[test]
    fn urgent_preset_scales_by_one_point_five() {
        let r = resolve(&FeePreset::Urgent, &base());
        assert_eq!(r.max_fee_per_gas, Amount::from(150i64));
        assert_eq!(r.max_priority_fee_per_gas, Amount::from(15i64));
    }

    #[test]
    fn gas_bump_scales_above_base() {
        let r = resolve_bump(&base(), 1_000);
        assert_eq!(r.max_fee_per_gas, Amount::from(110i64));
    }

    #[test]
    fn custom_preset_ignores_base() {
        let custom = FeePreset::Custom {
            max_fee_per_gas: Amount::from(7i64),
            max_priority_fee_per_gas: Amount::from(1i64),
        };
        let r = resolve(&custom, &base());
        assert_eq!(r.max_fee_per_gas, Amount::from(7i64));
    }
}
