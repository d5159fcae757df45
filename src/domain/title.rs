//! Title Metadata - 标题拆分与说明文字

/// 标题分隔符
pub const TITLE_SEPARATOR: char = '/';

/// 说明文字保留的最大字符数（按 Unicode 码点计）
pub const MAX_CAPTION_CHARS: usize = 1023;

/// 截断标记
pub const TRUNCATION_MARKER: char = '…';

/// 拆分后的曲目信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTitle {
    pub title: String,
    pub album: String,
}

/// 按 `节目名/专辑名/集数` 的命名约定拆分标题
///
/// 只适配单个内容提供方的命名习惯，不是通用解析：
/// 恰好三段且都非空时取第一段为标题、第二段为专辑，第三段丢弃；
/// 其余情况整串作为标题，专辑为空。
pub fn split_title(raw: &str) -> TrackTitle {
    let parts: Vec<&str> = raw.split(TITLE_SEPARATOR).collect();

    match parts.as_slice() {
        [title, album, qualifier]
            if !title.is_empty() && !album.is_empty() && !qualifier.is_empty() =>
        {
            TrackTitle {
                title: title.to_string(),
                album: album.to_string(),
            }
        }
        _ => TrackTitle {
            title: raw.to_string(),
            album: String::new(),
        },
    }
}

/// 截断说明文字
///
/// 超过 [`MAX_CAPTION_CHARS`] 个码点时保留前 1023 个并追加 `…`。
pub fn truncate_caption(text: &str) -> String {
    match text.char_indices().nth(MAX_CAPTION_CHARS) {
        Some((byte_idx, _)) => {
            let mut cut = String::with_capacity(byte_idx + TRUNCATION_MARKER.len_utf8());
            cut.push_str(&text[..byte_idx]);
            cut.push(TRUNCATION_MARKER);
            cut
        }
        None => text.to_string(),
    }
}

/// 由原始标题和视频简介生成说明文字
pub fn build_caption(raw_title: &str, description: &str) -> String {
    let description = description.trim();
    if description.is_empty() {
        truncate_caption(raw_title)
    } else {
        truncate_caption(&format!("{}\n\n{}", raw_title, description))
    }
}
