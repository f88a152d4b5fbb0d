// Mapping from Books API DTOs to domain models

use super::models::Book;
use crate::books_client::{Volume, VolumesResponse};

pub fn map_volume_to_book(volume: Volume) -> Book {
    let Volume {
        id,
        volume_info,
        sale_info,
    } = volume;

    Book {
        id,
        title: volume_info.title,
        authors: volume_info.authors,
        description: volume_info.description,
        thumbnail_url: volume_info.image_links.map(|links| links.thumbnail),
        info_link: volume_info.info_link,
        buy_link: sale_info.and_then(|s| s.buy_link),
    }
}

/// Books in server order.
pub fn map_response_to_books(response: VolumesResponse) -> Vec<Book> {
    response
        .items
        .into_iter()
        .map(map_volume_to_book)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_nested_links_and_optional_sale_info() {
        let json = r#"{
            "items": [
                {
                    "id": "a1",
                    "volumeInfo": {
                        "title": "With links",
                        "authors": ["Jane Doe"],
                        "imageLinks": { "thumbnail": "http://books.example/a1.jpg" },
                        "infoLink": "http://books.example/a1"
                    },
                    "saleInfo": { "buyLink": "https://store.example/a1" }
                },
                {
                    "id": "b2",
                    "volumeInfo": { "title": "Bare" },
                    "saleInfo": { "country": "US" }
                }
            ]
        }"#;
        let response: VolumesResponse = serde_json::from_str(json).unwrap();
        let books = map_response_to_books(response);

        assert_eq!(books.len(), 2);
        assert_eq!(books[0].authors.as_deref(), Some(&["Jane Doe".to_string()][..]));
        assert_eq!(
            books[0].thumbnail_url.as_deref(),
            Some("http://books.example/a1.jpg")
        );
        assert_eq!(books[0].buy_link.as_deref(), Some("https://store.example/a1"));
        assert_eq!(books[1].authors, None);
        assert_eq!(books[1].thumbnail_url, None);
        assert_eq!(books[1].buy_link, None);
    }
}
