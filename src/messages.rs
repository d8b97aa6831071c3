//! User-facing reply texts.

pub const HELP: &str = "👋 ابعت رقم الإذن وهجيبلك البيانات.\n\
لو الملف اتحدث: /reload لإعادة التحميل.\n\
لتقارير الموردين: /report";

pub const RELOAD_OK: &str = "✅ تم إعادة تحميل الملف.";

pub const RELOAD_FAILED: &str = "❌ فشل تحميل الملف. تأكد من الرابط.";

pub const DATA_UNAVAILABLE: &str = "⚠️ الملف غير محمل. استخدم /reload.";

pub const NOT_FOUND: &str = "❌ الرقم مش موجود";

pub const REPORT_STARTED: &str = "⏳ جاري تجهيز تقارير الموردين...";

pub const NO_GROUPS: &str = "⚠️ مفيش موردين متحددين في الإعدادات.";

pub const INTERNAL_ERROR: &str = "❌ حصلت مشكلة، حاول تاني.";

pub fn reload_failed(empty_sheets: &[&str]) -> String {
    format!("{}\nالشيتات الفاضية: {}", RELOAD_FAILED, empty_sheets.join("، "))
}

pub fn missing_column(column: &str) -> String {
    format!("❌ مش لاقي العمود '{}'.", column)
}

pub fn report_no_data(group: &str) -> String {
    format!("⚠️ مفيش بيانات للمورد: {}", group)
}

pub fn report_caption(group: &str, rows: usize) -> String {
    format!("📄 {} ({})", group, rows)
}

pub fn report_failed(group: &str) -> String {
    format!("❌ تعذر إرسال تقرير {}", group)
}
