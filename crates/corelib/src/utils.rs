/// Reads a build-time environment variable as `usize`, `$d` if missing or invalid
#[macro_export]
macro_rules! option_usize_env {
    ($s:expr, $d:expr) => {
        $crate::parse_string_as_usize(option_env!($s), $d)
    };
}

pub const fn parse_string_as_usize(key: Option<&'static str>, default: usize) -> usize {
    let Some(num) = key else {
        return default;
    };

    if num.is_empty() {
        return default;
    }

    // str::parse is not const yet
    let mut res: usize = 0;
    let mut bytes = num.as_bytes();
    while let [byte, rest @ ..] = bytes {
        bytes = rest;
        if !byte.is_ascii_digit() {
            return default;
        }

        res = match res.checked_mul(10) {
            Some(v) => v,
            None => return default,
        };
        res = match res.checked_add((*byte - b'0') as usize) {
            Some(v) => v,
            None => return default,
        };
    }

    res
}
