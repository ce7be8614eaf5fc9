use crate::error::CliError;
use model::core::value::Value;
use serde::Serialize;

#[derive(Serialize)]
struct CompiledOutput<'a> {
    sql: &'a str,
    params: &'a [Value],
}

pub fn print_compiled(sql: &str, params: &[Value], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json = serde_json::to_string_pretty(&CompiledOutput { sql, params })
            .map_err(CliError::JsonSerialize)?;
        println!("{json}");
        return Ok(());
    }

    println!("{sql}");
    if !params.is_empty() {
        println!("-----------------------------");
        for (i, param) in params.iter().enumerate() {
            println!("{:<6} {param}", format!("${}", i + 1));
        }
    }
    Ok(())
}
