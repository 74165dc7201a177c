//! User-facing reply texts (Vietnamese, Markdown).
//!
//! Every degraded path gets a deterministic message here; raw errors never
//! reach the chat.

use crate::catalog::CatalogItem;
use crate::pipeline::ResolutionOutcome;

pub const WELCOME: &str = "👋 Xin chào! Gửi cho tôi một bức ảnh trái cây, \
    tôi sẽ nhận diện và cho bạn biết giá cùng mô tả.";

pub const RECOGNIZING: &str = "⏳ Đang nhận diện hình ảnh, vui lòng chờ...";

pub const IMAGE_LOAD_FAILED: &str = "**Kết quả:** Không thể tải hình ảnh.";

pub const RECOGNITION_FAILED: &str =
    "**Kết quả:** Xin lỗi, tôi không thể nhận diện chính xác hình ảnh này.";

pub const FORBIDDEN: &str = "🚫 Bạn không có quyền thực hiện lệnh này.";

pub const GENERIC_FAILURE: &str = "❌ Đã xảy ra lỗi, vui lòng thử lại sau.";

pub const EMPTY_CATALOG: &str = "📋 Danh mục hiện đang trống.";

pub fn help(is_admin: bool) -> String {
    let mut text = String::from(
        "Gửi một bức ảnh trái cây để tra cứu giá.\n\
         /start — lời chào\n\
         /help — trợ giúp",
    );
    if is_admin {
        text.push_str(
            "\n\nLệnh quản trị:\n\
             /addfruit <tên> <giá> <mô tả>\n\
             /updatefruit <tên> <giá> <mô tả>\n\
             /deletefruit <tên>\n\
             /listfruits",
        );
    }
    text
}

pub fn usage(usage: &str) -> String {
    format!("Cú pháp: `{usage}`")
}

/// Escape legacy-Markdown control characters in user-supplied text.
///
/// Catalog names and recognizer labels end up inside `*…*` emphasis; an
/// unescaped `*` or `_` there unbalances the markup and Telegram rejects
/// the whole message.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render a resolution outcome as the final reply text.
pub fn outcome(outcome: &ResolutionOutcome) -> String {
    match outcome {
        ResolutionOutcome::Identified(item) => identified(item),
        ResolutionOutcome::UnknownLabel(label) => format!(
            "**Kết quả:** Tôi nhận ra *{}*, nhưng loại trái cây này \
             chưa có trong danh mục. Danh mục sẽ sớm được cập nhật!",
            escape_markdown(label)
        ),
        ResolutionOutcome::RecognitionFailed => RECOGNITION_FAILED.to_string(),
    }
}

fn identified(item: &CatalogItem) -> String {
    format!(
        "**Kết quả:** {}\n💰 Giá: {}\n📝 {}",
        escape_markdown(&item.name),
        escape_markdown(&item.price),
        escape_markdown(&item.description)
    )
}

pub fn added(name: &str) -> String {
    format!("✅ Đã thêm *{}* vào danh mục.", escape_markdown(name))
}

pub fn already_present(name: &str) -> String {
    format!("ℹ️ *{}* đã có trong danh mục.", escape_markdown(name))
}

pub fn updated(name: &str) -> String {
    format!("✅ Đã cập nhật *{}*.", escape_markdown(name))
}

pub fn not_in_catalog(name: &str) -> String {
    format!("⚠️ Không tìm thấy *{}* trong danh mục.", escape_markdown(name))
}

pub fn deleted(name: &str) -> String {
    format!("✅ Đã xóa *{}* khỏi danh mục.", escape_markdown(name))
}

/// Numbered list in insertion order.
pub fn fruit_list(items: &[CatalogItem]) -> String {
    if items.is_empty() {
        return EMPTY_CATALOG.to_string();
    }

    let mut text = String::from("📋 Danh mục trái cây:");
    for (index, item) in items.iter().enumerate() {
        text.push_str(&format!(
            "\n{}. *{}* — {}",
            index + 1,
            escape_markdown(&item.name),
            escape_markdown(&item.price)
        ));
    }
    text
}
