use coterie_engine::api::{
    available_disciplines_json, diff_json, new_character_json, recalculate_json,
    toggle_power, ToggleRequest,
};
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde_json::json;

fn ok_payload(value: serde_json::Value) -> String {
    json!({ "ok": true, "result": value }).to_string()
}

fn err_payload(e: impl std::fmt::Display) -> String {
    json!({ "ok": false, "error": format!("{:#}", e) }).to_string()
}

fn envelope<T: serde::Serialize>(result: anyhow::Result<T>) -> String {
    match result.and_then(|value| Ok(serde_json::to_value(value)?)) {
        Ok(value) => ok_payload(value),
        Err(e) => err_payload(e),
    }
}

fn to_jstring(env: &JNIEnv, payload: String) -> jstring {
    env.new_string(payload)
        .map(|s| s.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

fn read_input(env: &mut JNIEnv, input: &JString) -> Result<String, String> {
    env.get_string(input)
        .map(Into::into)
        .map_err(|e| err_payload(format!("invalid_input: {}", e)))
}

/// Run `f` over a Java string argument and hand back the JSON envelope.
fn call(env: &mut JNIEnv, input: &JString, f: impl FnOnce(&str) -> String) -> jstring {
    let payload = match read_input(env, input) {
        Ok(s) => f(&s),
        Err(payload) => payload,
    };
    to_jstring(env, payload)
}

#[no_mangle]
pub extern "system" fn Java_com_coterie_Ffi_version<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    to_jstring(&env, format!("coterie-ffi {}", env!("CARGO_PKG_VERSION")))
}

/// `kind` is one of vampire, ghoul, mage.
#[no_mangle]
pub extern "system" fn Java_com_coterie_Ffi_newCharacterJson<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    kind: JString<'local>,
    name: JString<'local>,
) -> jstring {
    let name = match read_input(&mut env, &name) {
        Ok(s) => s,
        Err(payload) => return to_jstring(&env, payload),
    };
    call(&mut env, &kind, |kind| new_character_internal(kind, &name))
}

#[no_mangle]
pub extern "system" fn Java_com_coterie_Ffi_diffJson<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    json: JString<'local>,
) -> jstring {
    call(&mut env, &json, diff_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_coterie_Ffi_recalculateJson<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    json: JString<'local>,
) -> jstring {
    call(&mut env, &json, recalculate_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_coterie_Ffi_togglePowerJson<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    json: JString<'local>,
) -> jstring {
    call(&mut env, &json, toggle_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_coterie_Ffi_availableDisciplinesJson<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    json: JString<'local>,
) -> jstring {
    call(&mut env, &json, available_internal)
}

// Internal functions for testing without JNI overhead
pub fn new_character_internal(kind: &str, name: &str) -> String {
    envelope(new_character_json(kind, name).and_then(|s| Ok(serde_json::from_str::<serde_json::Value>(&s)?)))
}

pub fn diff_internal(json: &str) -> String {
    envelope(diff_json(json))
}

pub fn recalculate_internal(json: &str) -> String {
    envelope(recalculate_json(json).and_then(|s| Ok(serde_json::from_str::<serde_json::Value>(&s)?)))
}

pub fn toggle_internal(json: &str) -> String {
    let request = serde_json::from_str::<ToggleRequest>(json)
        .map_err(|e| anyhow::anyhow!("invalid_request: {}", e));
    envelope(request.and_then(toggle_power))
}

pub fn available_internal(json: &str) -> String {
    envelope(available_disciplines_json(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn parse(payload: &str) -> Value {
        serde_json::from_str(payload).unwrap()
    }

    #[test]
    fn new_character_returns_envelope() {
        let v = parse(&new_character_internal("vampire", "Lucita"));
        assert_eq!(v["ok"], true);
        assert_eq!(v["result"]["type"], "Vampire");
        assert_eq!(v["result"]["data"]["name"], "Lucita");
    }

    #[test]
    fn unknown_kind_is_an_error_payload() {
        let v = parse(&new_character_internal("werewolf", "Rex"));
        assert_eq!(v["ok"], false);
        assert!(v["error"].as_str().unwrap().contains("werewolf"));
    }

    #[test]
    fn diff_of_identical_characters_is_empty() {
        let created = parse(&new_character_internal("ghoul", "Renfield"));
        let character = &created["result"];
        let request = json!({ "before": character, "after": character }).to_string();
        let v = parse(&diff_internal(&request));
        assert_eq!(v["ok"], true);
        assert_eq!(v["result"]["changes"], json!([]));
        assert_eq!(v["result"]["summary"], Value::Null);
    }

    #[test]
    fn toggle_selects_catalog_power() {
        let mut vampire = coterie_engine::Character::new_vampire("Beckett");
        vampire
            .learn_discipline(coterie_engine::content::standard_discipline("Fortitude").unwrap())
            .unwrap();
        let request = json!({
            "character": vampire,
            "discipline": "Fortitude",
            "power": "resilience",
            "level": 1,
        })
        .to_string();
        let v = parse(&toggle_internal(&request));
        assert_eq!(v["ok"], true);
        assert_eq!(v["result"]["selected"], true);
        assert_eq!(v["result"]["current_level"], 1);
        assert_eq!(v["result"]["character"]["data"]["health"], 5);
    }

    #[test]
    fn available_lists_catalog_for_a_fresh_ghoul() {
        let created = parse(&new_character_internal("ghoul", "Renfield"));
        let v = parse(&available_internal(&created["result"].to_string()));
        assert_eq!(v["ok"], true);
        assert_eq!(v["result"].as_array().unwrap().len(), 11);
    }

    #[test]
    fn malformed_json_is_an_error_payload() {
        assert_eq!(parse(&recalculate_internal("{not json"))["ok"], false);
        assert_eq!(parse(&toggle_internal("[]"))["ok"], false);
    }
}
