pub const WELCOME: &str = "Welcome\nWhat is your username?";

pub const AGE_PROMPT: &str = "How old are you?";

pub const AGE_RETRY_PROMPT: &str = "How old are you?!!";

pub const HELP: &str = r#"
---------Command lines----------
/help
/ping <hostname/IP>
/port <hostname/IP> <start_port> <end_port> <#num_requests>
/res_time <hostname/IP> <port> <#num_requests>
/GET <user_ID>
/POST <user_name> <user_age>
/exit
'#' means you can send nothing:)
--------------------------------------
"#;

pub fn greeting(name: &str) -> String {
    format!("\nHi {name}:)")
}
