use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// 除 `-._~` 外全部编码
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// 可打印 ASCII 文件名原样返回，否则整体百分号编码
pub fn sanitize_filename(name: &str) -> String {
    if name.bytes().all(|b| (0x20..0x7f).contains(&b)) {
        name.to_string()
    } else {
        utf8_percent_encode(name, FILENAME_ENCODE_SET).to_string()
    }
}

pub fn content_disposition(name: &str) -> String {
    format!("attachment; filename*=UTF-8''{}", sanitize_filename(name))
}

/// 访问码放进查询串前的编码，保留 `/`
pub fn quote_code(code: &str) -> String {
    const CODE_ENCODE_SET: &AsciiSet = &FILENAME_ENCODE_SET.remove(b'/');
    utf8_percent_encode(code, CODE_ENCODE_SET).to_string()
}
