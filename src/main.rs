fn main() -> std::process::ExitCode {
    pixbot_lib::run()
}
