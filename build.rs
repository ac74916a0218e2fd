fn main() {
    let out_dir = std::env::var_os("OUT_DIR").unwrap();
    let dest_path = std::path::Path::new(&out_dir).join("parity_table.rs");

    let mut src = String::new();

    // ------------------- odd parity LUT generation -------------------
    // NOTE: 1 means the byte has an odd number of set bits
    src.push_str("static PARITY:[u8;256]=[");
    for i in 0..=255_u8 {
        let mut odd = 0;
        let mut b = i;
        while b != 0 {
            odd ^= b & 1;
            b >>= 1;
        }
        src.push_str(&odd.to_string());
        src.push(',');
    }
    src.push_str("];");

    std::fs::write(&dest_path, src).unwrap();
    println!("cargo::rerun-if-changed=build.rs");
}
