//! Builtin function table for the expression interpreter.

use std::collections::HashMap;

use super::ast::Value;

/// Type for function implementations callable from expressions.
pub type ExprFunction = Box<dyn Fn(Vec<Value>) -> Result<Value, String>>;

fn number_arg(args: &[Value], index: usize, name: &str) -> Result<f64, String> {
    match args.get(index) {
        Some(Value::Number(n)) => Ok(*n),
        _ => Err(format!("{}() requires numeric arguments", name)),
    }
}

/// Returns the default set of builtin functions.
pub fn builtin_functions() -> HashMap<String, ExprFunction> {
    let mut functions: HashMap<String, ExprFunction> = HashMap::new();

    functions.insert(
        "min".to_string(),
        Box::new(|args| {
            if args.len() != 2 {
                return Err("min() requires exactly 2 arguments".to_string());
            }
            let a = number_arg(&args, 0, "min")?;
            let b = number_arg(&args, 1, "min")?;
            Ok(Value::Number(a.min(b)))
        }),
    );

    functions.insert(
        "max".to_string(),
        Box::new(|args| {
            if args.len() != 2 {
                return Err("max() requires exactly 2 arguments".to_string());
            }
            let a = number_arg(&args, 0, "max")?;
            let b = number_arg(&args, 1, "max")?;
            Ok(Value::Number(a.max(b)))
        }),
    );

    functions.insert(
        "clamp".to_string(),
        Box::new(|args| {
            if args.len() != 3 {
                return Err("clamp() requires exactly 3 arguments".to_string());
            }
            let value = number_arg(&args, 0, "clamp")?;
            let min = number_arg(&args, 1, "clamp")?;
            let max = number_arg(&args, 2, "clamp")?;
            Ok(Value::Number(value.max(min).min(max)))
        }),
    );

    functions.insert(
        "abs".to_string(),
        Box::new(|args| {
            if args.len() != 1 {
                return Err("abs() requires exactly 1 argument".to_string());
            }
            let n = number_arg(&args, 0, "abs")?;
            Ok(Value::Number(n.abs()))
        }),
    );

    functions.insert(
        "round".to_string(),
        Box::new(|args| {
            if args.len() != 1 {
                return Err("round() requires exactly 1 argument".to_string());
            }
            let n = number_arg(&args, 0, "round")?;
            Ok(Value::Number(n.round()))
        }),
    );

    functions.insert(
        "len".to_string(),
        Box::new(|args| {
            if args.len() != 1 {
                return Err("len() requires exactly 1 argument".to_string());
            }
            let length = match &args[0] {
                Value::String(s) => s.chars().count(),
                Value::Array(items) => items.len(),
                Value::Object(map) => map.len(),
                Value::Null => 0,
                _ => return Err("len() requires a string, array or object".to_string()),
            };
            Ok(Value::Number(length as f64))
        }),
    );

    functions.insert(
        "contains".to_string(),
        Box::new(|args| {
            if args.len() != 2 {
                return Err("contains() requires exactly 2 arguments".to_string());
            }
            let result = match (&args[0], &args[1]) {
                (Value::String(haystack), Value::String(needle)) => haystack.contains(needle),
                (Value::Array(items), needle) => {
                    let needle: serde_json::Value = needle.clone().into();
                    items.contains(&needle)
                }
                _ => false,
            };
            Ok(Value::Boolean(result))
        }),
    );

    functions.insert(
        "empty".to_string(),
        Box::new(|args| {
            if args.len() != 1 {
                return Err("empty() requires exactly 1 argument".to_string());
            }
            Ok(Value::Boolean(!args[0].is_truthy()))
        }),
    );

    functions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_clamp() {
        let functions = builtin_functions();
        let clamp = functions.get("clamp").unwrap();
        let result = clamp(vec![
            Value::Number(150.0),
            Value::Number(0.0),
            Value::Number(100.0),
        ])
        .unwrap();
        assert_eq!(result, Value::Number(100.0));
    }

    #[test]
    fn test_builtin_len_counts_chars() {
        let functions = builtin_functions();
        let len = functions.get("len").unwrap();
        let result = len(vec![Value::String("héllo".to_string())]).unwrap();
        assert_eq!(result, Value::Number(5.0));
    }

    #[test]
    fn test_builtin_contains_array_membership() {
        let functions = builtin_functions();
        let contains = functions.get("contains").unwrap();
        let items = vec![serde_json::json!("a"), serde_json::json!("b")];
        let result = contains(vec![Value::Array(items), Value::String("b".to_string())]).unwrap();
        assert_eq!(result, Value::Boolean(true));
    }
}
