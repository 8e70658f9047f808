fn main() {
    println!("cargo:rerun-if-changed=assets/logo.ico");
    #[cfg(target_os = "windows")]
    {
        let mut res = winres::WindowsResource::new();
        res.set_icon("assets/logo.ico");
        res.compile().expect("Failed to compile Windows resources");
    }
}
