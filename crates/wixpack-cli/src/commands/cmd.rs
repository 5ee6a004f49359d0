use super::{json_pretty, EXIT_SUCCESS};
use wixpack_core::{generate_cmd, CommandOptions};

pub fn run(opts: &CommandOptions, json: bool) -> Result<u8, String> {
    let cmd = generate_cmd(opts);
    if json {
        let lines: Vec<&str> = cmd.lines().collect();
        let payload = serde_json::json!({ "commands": lines });
        println!("{}", json_pretty(&payload)?);
    } else {
        print!("{cmd}");
    }
    Ok(EXIT_SUCCESS)
}
