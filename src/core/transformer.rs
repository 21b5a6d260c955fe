use crate::domain::model::{ScrapedOption, ScrapedProduct};
use crate::domain::payload::*;
use crate::utils::error::{Result, SmartstoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 平台一個商品最多 10 張圖（代表圖 1 + 附加圖 9）
pub const MAX_IMAGES: usize = 10;

/// 爬到的選項若含此字樣代表已停售
pub const SOLD_OUT_MARKER: &str = "판매종료";

/// 爬蟲沒提供或平台必填、但商家通常不在意的欄位預設值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDefaults {
    pub category_id: String,
    pub stock_quantity: u32,
    pub origin: String,
    pub origin_area_code: String,
    pub importer: String,
    pub base_delivery_fee: u32,
    pub return_delivery_fee: u32,
    pub exchange_delivery_fee: u32,
    pub manufacturer_name: String,
    pub brand_name: String,
    pub after_service_telephone: String,
    pub after_service_guide: String,
    pub notice_type: NoticeType,
    pub notice_placeholder: String,
    pub pack_date: String,
    pub option_group_name: String,
}

impl Default for ProductDefaults {
    fn default() -> Self {
        Self {
            category_id: "50000803".to_string(),
            stock_quantity: 999,
            origin: "수입산".to_string(),
            origin_area_code: "0200037".to_string(),
            importer: "주식회사 수입사".to_string(),
            base_delivery_fee: 0,
            return_delivery_fee: 3000,
            exchange_delivery_fee: 3000,
            manufacturer_name: "제조사".to_string(),
            brand_name: "브랜드".to_string(),
            after_service_telephone: "1234-5678".to_string(),
            after_service_guide: "구매자 단순변심 반품 가능".to_string(),
            notice_type: NoticeType::Wear,
            notice_placeholder: "상세페이지 참조".to_string(),
            pack_date: "2024-01".to_string(),
            option_group_name: "옵션".to_string(),
        }
    }
}

/// 價格文字只保留數字，例如 `"12,000원"` -> 12000。沒有數字或溢位時回傳 0。
pub fn parse_price(price_text: &str) -> u64 {
    let digits: String = price_text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// 取選項文字中 `(` 之前的部分
pub fn extract_option_label(raw: &str) -> String {
    raw.split('(').next().unwrap_or_default().trim().to_string()
}

/// 依首次出現順序去重，大小寫視為不同
pub fn unique_option_names(options: &[ScrapedOption]) -> Vec<String> {
    let mut seen = HashSet::new();
    options
        .iter()
        .filter(|opt| !opt.name.contains(SOLD_OUT_MARKER))
        .map(|opt| extract_option_label(&opt.name))
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Transformer {
    defaults: ProductDefaults,
}

impl Transformer {
    pub fn new(defaults: ProductDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &ProductDefaults {
        &self.defaults
    }

    /// 把爬取結果轉成商品建立 API 的本體。純函式，不做任何 I/O。
    pub fn format(&self, scraped: &ScrapedProduct) -> Result<ProductPayload> {
        let title = scraped.title.trim();
        if title.is_empty() {
            return Err(SmartstoreError::validation("title", "Product title is required"));
        }

        let sale_price = parse_price(&scraped.price_text);
        if sale_price == 0 {
            return Err(SmartstoreError::validation(
                "priceText",
                format!("No numeric price found in '{}'", scraped.price_text),
            ));
        }

        let image_urls: Vec<String> = scraped
            .images
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .take(MAX_IMAGES)
            .map(str::to_string)
            .collect();
        let images = ProductImages::from_urls(&image_urls).ok_or_else(|| {
            SmartstoreError::validation("images", "At least one product image is required")
        })?;

        let option_names = unique_option_names(&scraped.options);
        tracing::debug!(
            "🧾 Formatting '{}': price={}, images={}, options={}",
            title,
            sale_price,
            image_urls.len(),
            option_names.len()
        );

        let d = &self.defaults;
        let origin = scraped
            .origin
            .as_deref()
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .unwrap_or(&d.origin);
        let detail_content = scraped
            .description
            .as_deref()
            .map(str::trim)
            .filter(|desc| !desc.is_empty())
            .unwrap_or(title);

        Ok(ProductPayload {
            origin_product: OriginProduct {
                status_type: "SALE".to_string(),
                sale_type: "NEW".to_string(),
                leaf_category_id: d.category_id.clone(),
                name: title.to_string(),
                detail_content: detail_content.to_string(),
                images,
                sale_price,
                stock_quantity: d.stock_quantity,
                delivery_info: self.delivery_info(),
                detail_attribute: DetailAttribute {
                    naver_shopping_search_info: NaverShoppingSearchInfo {
                        manufacturer_name: d.manufacturer_name.clone(),
                        brand_name: d.brand_name.clone(),
                    },
                    after_service_info: AfterServiceInfo {
                        after_service_telephone_number: d.after_service_telephone.clone(),
                        after_service_guide_content: d.after_service_guide.clone(),
                    },
                    origin_area_info: OriginAreaInfo {
                        origin_area_code: d.origin_area_code.clone(),
                        content: origin.to_string(),
                        plural: false,
                        importer: d.importer.clone(),
                    },
                    product_info_provided_notice: self.notice(title),
                    minor_purchasable: false,
                    option_info: self.option_info(option_names),
                },
            },
            smartstore_channel_product: SmartstoreChannelProduct {
                naver_shopping_registration: true,
                channel_product_display_status_type: "ON".to_string(),
            },
        })
    }

    fn delivery_info(&self) -> DeliveryInfo {
        let d = &self.defaults;
        DeliveryInfo {
            delivery_type: "DELIVERY".to_string(),
            delivery_attribute_type: "NORMAL".to_string(),
            delivery_fee: DeliveryFee {
                delivery_fee_type: if d.base_delivery_fee == 0 { "FREE" } else { "PAID" }
                    .to_string(),
                base_fee: d.base_delivery_fee,
            },
            claim_delivery_info: ClaimDeliveryInfo {
                return_delivery_fee: d.return_delivery_fee,
                exchange_delivery_fee: d.exchange_delivery_fee,
            },
        }
    }

    fn option_info(&self, names: Vec<String>) -> Option<OptionInfo> {
        if names.is_empty() {
            return None;
        }

        Some(OptionInfo {
            option_combination_sort_type: "CREATE".to_string(),
            option_combination_group_names: OptionGroupNames {
                option_group_name1: self.defaults.option_group_name.clone(),
            },
            option_combinations: names
                .into_iter()
                .map(|name| OptionCombination {
                    option_name1: name,
                    stock_quantity: self.defaults.stock_quantity,
                    price: 0,
                    usable: true,
                })
                .collect(),
            use_stock_management: true,
        })
    }

    fn notice(&self, title: &str) -> ProductInfoProvidedNotice {
        let d = &self.defaults;
        let filler = || d.notice_placeholder.clone();
        let mut notice = ProductInfoProvidedNotice {
            product_info_provided_notice_type: d.notice_type,
            wear: None,
            shoes: None,
            etc: None,
        };

        match d.notice_type {
            NoticeType::Wear => {
                notice.wear = Some(WearNotice {
                    material: filler(),
                    color: filler(),
                    size: filler(),
                    manufacturer: filler(),
                    caution: filler(),
                    pack_date: d.pack_date.clone(),
                    warranty_policy: filler(),
                    after_service_director: d.after_service_telephone.clone(),
                })
            }
            NoticeType::Shoes => {
                notice.shoes = Some(ShoesNotice {
                    material: filler(),
                    color: filler(),
                    size: filler(),
                    height: filler(),
                    manufacturer: filler(),
                    caution: filler(),
                    warranty_policy: filler(),
                    after_service_director: d.after_service_telephone.clone(),
                })
            }
            NoticeType::Etc => {
                notice.etc = Some(EtcNotice {
                    item_name: title.to_string(),
                    model_name: filler(),
                    manufacturer: filler(),
                    after_service_director: d.after_service_telephone.clone(),
                })
            }
        }

        notice
    }
}

/// 使用預設值轉換
pub fn format_product(scraped: &ScrapedProduct) -> Result<ProductPayload> {
    Transformer::default().format(scraped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shirt() -> ScrapedProduct {
        ScrapedProduct {
            title: "Shirt".to_string(),
            price_text: "19,900원".to_string(),
            images: vec!["http://x/1.jpg".to_string()],
            options: vec![],
            origin: None,
            description: None,
        }
    }

    fn options(names: &[&str]) -> Vec<ScrapedOption> {
        names
            .iter()
            .map(|name| ScrapedOption {
                name: name.to_string(),
                stock_hint: None,
            })
            .collect()
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("12,000원"), 12000);
        assert_eq!(parse_price("₩ 1 234"), 1234);
        assert_eq!(parse_price(""), 0);
        assert_eq!(parse_price("가격문의"), 0);
        assert_eq!(parse_price("99999999999999999999999"), 0);
    }

    #[test]
    fn test_unique_option_names_after_label_extraction() {
        let names = unique_option_names(&options(&["Red(3)", "Red(3)", "Blue(1)"]));
        assert_eq!(names, vec!["Red", "Blue"]);
    }

    #[test]
    fn test_unique_option_names_is_case_sensitive() {
        let names = unique_option_names(&options(&["red", "Red", "red"]));
        assert_eq!(names, vec!["red", "Red"]);
    }

    #[test]
    fn test_option_combinations_ignore_stock_hints() {
        let mut product = shirt();
        product.options = ["Red(3)", "Red(7)", "Blue(1)"]
            .into_iter()
            .filter_map(ScrapedOption::from_label)
            .collect();

        let value = serde_json::to_value(format_product(&product).unwrap()).unwrap();
        let combinations = &value["originProduct"]["detailAttribute"]["optionInfo"]["optionCombinations"];
        assert_eq!(
            combinations,
            &json!([
                {"optionName1": "Red", "stockQuantity": 999, "price": 0, "usable": true},
                {"optionName1": "Blue", "stockQuantity": 999, "price": 0, "usable": true}
            ])
        );
    }

    #[test]
    fn test_sold_out_labels_never_become_combinations() {
        let mut product = shirt();
        product.options = ["Red(판매종료)", "Blue"]
            .into_iter()
            .filter_map(ScrapedOption::from_label)
            .collect();

        let value = serde_json::to_value(format_product(&product).unwrap()).unwrap();
        let combinations = &value["originProduct"]["detailAttribute"]["optionInfo"]["optionCombinations"];
        assert_eq!(combinations.as_array().map(Vec::len), Some(1));
        assert_eq!(combinations[0]["optionName1"], json!("Blue"));
    }

    #[test]
    fn test_replace_images_requires_hosted_urls() {
        let mut payload = format_product(&shirt()).unwrap();

        let result = payload.replace_images(&[]);
        assert!(matches!(
            result,
            Err(SmartstoreError::ValidationError { ref field, .. }) if field == "images"
        ));
        assert_eq!(payload.image_urls(), vec!["http://x/1.jpg".to_string()]);

        payload
            .replace_images(&["https://shop-phinf.pstatic.net/1.jpg".to_string()])
            .unwrap();
        assert_eq!(payload.image_urls(), vec!["https://shop-phinf.pstatic.net/1.jpg".to_string()]);
    }

    #[test]
    fn test_sold_out_options_are_dropped() {
        let names = unique_option_names(&options(&["Red(판매종료)", "Blue(2)", "  ", "(5)"]));
        assert_eq!(names, vec!["Blue"]);
    }

    #[test]
    fn test_format_minimal_shirt() {
        let payload = format_product(&shirt()).unwrap();
        let origin = &payload.origin_product;

        assert_eq!(origin.sale_price, 19900);
        assert_eq!(origin.images.representative_image.url, "http://x/1.jpg");
        assert!(origin.images.optional_images.is_empty());
        assert!(origin.detail_attribute.option_info.is_none());
        assert_eq!(origin.stock_quantity, 999);
        assert_eq!(origin.detail_attribute.origin_area_info.content, "수입산");
        assert_eq!(origin.detail_content, "Shirt");

        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["originProduct"]["detailAttribute"].get("optionInfo").is_none());
    }

    #[test]
    fn test_format_wire_shape() {
        let mut product = shirt();
        product.options = options(&["Red(3)", "Red(3)", "Blue(1)"]);
        product.origin = Some("중국".to_string());

        let value = serde_json::to_value(format_product(&product).unwrap()).unwrap();
        let origin = &value["originProduct"];

        assert_eq!(origin["leafCategoryId"], json!("50000803"));
        assert_eq!(origin["salePrice"], json!(19900));
        assert_eq!(origin["deliveryInfo"]["deliveryFee"]["deliveryFeeType"], json!("FREE"));
        assert_eq!(
            origin["deliveryInfo"]["claimDeliveryInfo"],
            json!({"returnDeliveryFee": 3000, "exchangeDeliveryFee": 3000})
        );
        assert_eq!(origin["detailAttribute"]["originAreaInfo"]["content"], json!("중국"));
        assert_eq!(origin["detailAttribute"]["minorPurchasable"], json!(false));

        let option_info = &origin["detailAttribute"]["optionInfo"];
        assert_eq!(option_info["optionCombinationGroupNames"]["optionGroupName1"], json!("옵션"));
        assert_eq!(
            option_info["optionCombinations"],
            json!([
                {"optionName1": "Red", "stockQuantity": 999, "price": 0, "usable": true},
                {"optionName1": "Blue", "stockQuantity": 999, "price": 0, "usable": true}
            ])
        );

        let notice = &origin["detailAttribute"]["productInfoProvidedNotice"];
        assert_eq!(notice["productInfoProvidedNoticeType"], json!("WEAR"));
        assert_eq!(notice["wear"]["packDate"], json!("2024-01"));
        assert!(notice.get("shoes").is_none());

        assert_eq!(
            value["smartstoreChannelProduct"],
            json!({"naverShoppingRegistration": true, "channelProductDisplayStatusType": "ON"})
        );
    }

    #[test]
    fn test_representative_image_not_repeated_in_optional_images() {
        let mut product = shirt();
        product.images = (1..=12).map(|i| format!("http://x/{}.jpg", i)).collect();

        let payload = format_product(&product).unwrap();
        let images = &payload.origin_product.images;

        assert_eq!(images.representative_image.url, "http://x/1.jpg");
        assert_eq!(images.optional_images.len(), MAX_IMAGES - 1);
        assert_eq!(images.optional_images[0].url, "http://x/2.jpg");
        assert!(images.optional_images.iter().all(|img| img.url != "http://x/1.jpg"));
    }

    #[test]
    fn test_format_rejects_missing_fields() {
        let mut no_images = shirt();
        no_images.images.clear();
        assert!(matches!(
            format_product(&no_images),
            Err(SmartstoreError::ValidationError { ref field, .. }) if field == "images"
        ));

        let mut blank_images = shirt();
        blank_images.images = vec!["  ".to_string()];
        assert!(format_product(&blank_images).is_err());

        let mut no_title = shirt();
        no_title.title = "   ".to_string();
        assert!(matches!(
            format_product(&no_title),
            Err(SmartstoreError::ValidationError { ref field, .. }) if field == "title"
        ));

        let mut no_price = shirt();
        no_price.price_text = "가격문의".to_string();
        assert!(matches!(
            format_product(&no_price),
            Err(SmartstoreError::ValidationError { ref field, .. }) if field == "priceText"
        ));
    }

    #[test]
    fn test_custom_defaults_and_notice_type() {
        let defaults = ProductDefaults {
            category_id: "50000167".to_string(),
            base_delivery_fee: 2500,
            notice_type: NoticeType::Etc,
            ..ProductDefaults::default()
        };
        let value = serde_json::to_value(Transformer::new(defaults).format(&shirt()).unwrap()).unwrap();
        let origin = &value["originProduct"];

        assert_eq!(origin["leafCategoryId"], json!("50000167"));
        assert_eq!(origin["deliveryInfo"]["deliveryFee"]["deliveryFeeType"], json!("PAID"));
        assert_eq!(origin["deliveryInfo"]["deliveryFee"]["baseFee"], json!(2500));
        let notice = &origin["detailAttribute"]["productInfoProvidedNotice"];
        assert_eq!(notice["productInfoProvidedNoticeType"], json!("ETC"));
        assert_eq!(notice["etc"]["itemName"], json!("Shirt"));
        assert!(notice.get("wear").is_none());
    }
}
