use std::collections::BTreeMap;

use hp_core::{HoneyPotError, HpValue};
use rhai::{Array, Dynamic, ImmutableString, Map, FLOAT, INT};

pub fn hpvalue_to_dynamic(value: &HpValue) -> Result<Dynamic, HoneyPotError> {
    match value {
        HpValue::Null => Ok(Dynamic::UNIT),
        HpValue::Bool(value) => Ok(Dynamic::from_bool(*value)),
        HpValue::Number(value) => Ok(Dynamic::from_float(*value as FLOAT)),
        HpValue::Integer(value) => Ok(Dynamic::from_int(*value as INT)),
        HpValue::String(value) => Ok(Dynamic::from(value.clone())),
        HpValue::Array(values) => {
            let mut array = Array::new();
            for value in values {
                array.push(hpvalue_to_dynamic(value)?);
            }
            Ok(Dynamic::from_array(array))
        }
        HpValue::Map(values) => {
            let mut map = Map::new();
            for (key, value) in values {
                map.insert(key.as_str().into(), hpvalue_to_dynamic(value)?);
            }
            Ok(Dynamic::from_map(map))
        }
        HpValue::Opaque(kind) => Err(HoneyPotError::new(
            "HOST_STATE_INVALID",
            format!("Cannot hand a {} value to rhai.", kind),
        )),
    }
}

/// Total conversion: kinds with no [`HpValue`] counterpart become `Opaque`.
pub fn dynamic_to_hpvalue(value: Dynamic) -> HpValue {
    if value.is_unit() {
        return HpValue::Null;
    }
    if value.is::<bool>() {
        return HpValue::Bool(value.cast::<bool>());
    }
    if value.is::<INT>() {
        return HpValue::Integer(value.cast::<INT>());
    }
    if value.is::<FLOAT>() {
        return HpValue::Number(value.cast::<FLOAT>());
    }
    if value.is::<ImmutableString>() {
        return HpValue::String(value.cast::<ImmutableString>().to_string());
    }
    if value.is::<char>() {
        return HpValue::String(value.cast::<char>().to_string());
    }
    if value.is::<Array>() {
        let array = value.cast::<Array>();
        return HpValue::Array(array.into_iter().map(dynamic_to_hpvalue).collect());
    }
    if value.is::<Map>() {
        let map = value.cast::<Map>();
        let mut out = BTreeMap::new();
        for (key, value) in map {
            out.insert(key.to_string(), dynamic_to_hpvalue(value));
        }
        return HpValue::Map(out);
    }
    HpValue::Opaque(value.type_name().to_string())
}

/// JSON state for a rhai host. Whole JSON numbers stay integers so that
/// rhai scripts doing `INT` arithmetic on them keep working.
pub fn json_to_hpvalue(value: serde_json::Value) -> HpValue {
    match value {
        serde_json::Value::Null => HpValue::Null,
        serde_json::Value::Bool(value) => HpValue::Bool(value),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(value) => HpValue::Integer(value),
            None => HpValue::Number(number.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(value) => HpValue::String(value),
        serde_json::Value::Array(values) => {
            HpValue::Array(values.into_iter().map(json_to_hpvalue).collect())
        }
        serde_json::Value::Object(values) => HpValue::Map(
            values
                .into_iter()
                .map(|(key, value)| (key, json_to_hpvalue(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod bridge_tests {
    use super::*;

    #[test]
    fn scalars_keep_their_rhai_kind() {
        assert_eq!(dynamic_to_hpvalue(Dynamic::UNIT), HpValue::Null);
        assert_eq!(dynamic_to_hpvalue(Dynamic::from_int(3)), HpValue::Integer(3));
        assert_eq!(
            dynamic_to_hpvalue(Dynamic::from_float(2.5)),
            HpValue::Number(2.5)
        );
        assert_eq!(
            dynamic_to_hpvalue(Dynamic::from('x')),
            HpValue::String("x".to_string())
        );
    }

    #[test]
    fn containers_convert_recursively() {
        let value = HpValue::Map(BTreeMap::from([(
            "party".to_string(),
            HpValue::Array(vec![HpValue::Bool(true), HpValue::Null]),
        )]));
        let dynamic = hpvalue_to_dynamic(&value).expect("to dynamic");
        assert!(dynamic.is::<Map>());
        assert_eq!(dynamic_to_hpvalue(dynamic), value);
    }

    #[test]
    fn unsupported_kinds_become_opaque() {
        let timestamp = Dynamic::from(std::time::Duration::from_secs(1));
        assert!(matches!(
            dynamic_to_hpvalue(timestamp),
            HpValue::Opaque(_)
        ));
        let error = hpvalue_to_dynamic(&HpValue::Opaque("Fn".to_string()))
            .expect_err("opaque cannot go back");
        assert_eq!(error.code, "HOST_STATE_INVALID");
    }

    #[test]
    fn json_whole_numbers_stay_integers() {
        let value = json_to_hpvalue(serde_json::json!({"hp": 10, "speed": 1.5}));
        assert_eq!(
            value,
            HpValue::Map(BTreeMap::from([
                ("hp".to_string(), HpValue::Integer(10)),
                ("speed".to_string(), HpValue::Number(1.5)),
            ]))
        );
    }
}
