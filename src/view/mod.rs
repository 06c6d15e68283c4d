pub mod category_editor;
pub mod detail;
pub mod mount;
pub mod reconcile;
pub mod sections;

pub use category_editor::{CategoryEditor, FieldDraft};
pub use detail::ListingDetail;
pub use mount::MountHandle;
pub use reconcile::{
    detail_fields, display_unit, format_grouped, order_images, price_label, primary_image,
    render_custom_value, CardImage, DetailField,
};
pub use sections::{
    category_tabs, compose_section, CategoryTab, ClickOutcome, ListingCard, ListingSection,
    SectionFilter, SectionView, SortDirection,
};
