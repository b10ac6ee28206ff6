#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        use $crate::utils::log::log;

        let log_message = format!($($arg)*);
        log($module, log_message)
    }};
}

pub fn log(module: &str, message: String) {
    use colored::Colorize;
    use std::io::{Write, stderr};

    let colored_prefix = match module.to_lowercase().as_str() {
        "rules" => format!("[{module}]").bright_blue().bold(),
        "save" => format!("[{module}]").bright_green().bold(),
        "resolve" => format!("[{module}]").bright_cyan().bold(),
        "error" => format!("[{module}]").bright_red().bold(),
        _ => format!("[{module}]").bright_yellow().bold(),
    };

    let mut stderr = stderr().lock();
    writeln!(stderr, "{colored_prefix} {message}").ok();
    stderr.flush().ok();
}
