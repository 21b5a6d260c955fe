//! 商品建立 API 的請求本體。欄位名稱與巢狀層級是平台的外部介面，不可任意更動。

use crate::utils::error::{Result, SmartstoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub origin_product: OriginProduct,
    pub smartstore_channel_product: SmartstoreChannelProduct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginProduct {
    pub status_type: String,
    pub sale_type: String,
    pub leaf_category_id: String,
    pub name: String,
    pub detail_content: String,
    pub images: ProductImages,
    pub sale_price: u64,
    pub stock_quantity: u32,
    pub delivery_info: DeliveryInfo,
    pub detail_attribute: DetailAttribute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImages {
    pub representative_image: ImageUrl,
    #[serde(default)]
    pub optional_images: Vec<ImageUrl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ProductImages {
    /// 代表圖在前，其餘依原順序
    pub fn urls(&self) -> Vec<String> {
        std::iter::once(&self.representative_image)
            .chain(self.optional_images.iter())
            .map(|image| image.url.clone())
            .collect()
    }

    pub fn from_urls(urls: &[String]) -> Option<Self> {
        let (first, rest) = urls.split_first()?;
        Some(Self {
            representative_image: ImageUrl { url: first.clone() },
            optional_images: rest.iter().map(|url| ImageUrl { url: url.clone() }).collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
    pub delivery_type: String,
    pub delivery_attribute_type: String,
    pub delivery_fee: DeliveryFee,
    pub claim_delivery_info: ClaimDeliveryInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFee {
    pub delivery_fee_type: String,
    pub base_fee: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDeliveryInfo {
    pub return_delivery_fee: u32,
    pub exchange_delivery_fee: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailAttribute {
    pub naver_shopping_search_info: NaverShoppingSearchInfo,
    pub after_service_info: AfterServiceInfo,
    pub origin_area_info: OriginAreaInfo,
    pub product_info_provided_notice: ProductInfoProvidedNotice,
    pub minor_purchasable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_info: Option<OptionInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaverShoppingSearchInfo {
    pub manufacturer_name: String,
    pub brand_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AfterServiceInfo {
    pub after_service_telephone_number: String,
    pub after_service_guide_content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginAreaInfo {
    pub origin_area_code: String,
    pub content: String,
    pub plural: bool,
    pub importer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionInfo {
    pub option_combination_sort_type: String,
    pub option_combination_group_names: OptionGroupNames,
    pub option_combinations: Vec<OptionCombination>,
    pub use_stock_management: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionGroupNames {
    pub option_group_name1: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionCombination {
    pub option_name1: String,
    pub stock_quantity: u32,
    pub price: i64,
    pub usable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum NoticeType {
    #[default]
    Wear,
    Shoes,
    Etc,
}

/// 商品資訊提供告示。依類型只會帶其中一個區塊。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfoProvidedNotice {
    pub product_info_provided_notice_type: NoticeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wear: Option<WearNotice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoes: Option<ShoesNotice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etc: Option<EtcNotice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WearNotice {
    pub material: String,
    pub color: String,
    pub size: String,
    pub manufacturer: String,
    pub caution: String,
    pub pack_date: String,
    pub warranty_policy: String,
    pub after_service_director: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoesNotice {
    pub material: String,
    pub color: String,
    pub size: String,
    pub height: String,
    pub manufacturer: String,
    pub caution: String,
    pub warranty_policy: String,
    pub after_service_director: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcNotice {
    pub item_name: String,
    pub model_name: String,
    pub manufacturer: String,
    pub after_service_director: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartstoreChannelProduct {
    pub naver_shopping_registration: bool,
    pub channel_product_display_status_type: String,
}

impl ProductPayload {
    pub fn image_urls(&self) -> Vec<String> {
        self.origin_product.images.urls()
    }

    /// 以平台託管的網址取代原始圖片網址，順序必須與 `image_urls` 相同。
    /// 託管網址為空時回傳 `ValidationError`，原本的圖片保持不變。
    pub fn replace_images(&mut self, hosted: &[String]) -> Result<()> {
        self.origin_product.images = ProductImages::from_urls(hosted).ok_or_else(|| {
            SmartstoreError::validation("images", "Image upload returned no hosted URLs")
        })?;
        Ok(())
    }
}
