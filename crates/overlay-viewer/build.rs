use std::fs;
use std::path::Path;

fn pdfium_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "pdfium.dll"
    } else if cfg!(target_os = "macos") {
        "libpdfium.dylib"
    } else {
        "libpdfium.so"
    }
}

fn main() {
    let workspace_root = env!("CARGO_MANIFEST_DIR")
        .split("crates")
        .next()
        .expect("Failed to determine workspace root");

    let library_name = pdfium_library_name();
    let vendor_library = Path::new(workspace_root)
        .join("vendor")
        .join("pdfium")
        .join(library_name);

    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR not set");
    let out_path = Path::new(&out_dir);

    let target_dir = out_path
        .parent()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .expect("Failed to determine target directory");

    let dest_library = target_dir.join(library_name);

    if vendor_library.exists() {
        fs::copy(&vendor_library, &dest_library).expect("Failed to copy pdfium library");
        println!(
            "cargo:warning=Copied {} from vendor to {}",
            library_name,
            dest_library.display()
        );
    } else {
        println!(
            "cargo:warning=pdfium library not found at {}; falling back to the system library at runtime",
            vendor_library.display()
        );
    }

    println!("cargo:rerun-if-changed={}", vendor_library.display());
}
