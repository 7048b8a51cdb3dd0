fn main() {
    if let Err(err) = pagarexd::run_entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
