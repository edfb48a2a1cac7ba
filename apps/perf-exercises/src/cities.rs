//! Static city table backing the city finder.

use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct City {
    pub id: u32,
    pub name: &'static str,
    pub country: &'static str,
}

const CITY_TABLE: &[(&str, &str)] = &[
    ("Tokyo", "Japan"),
    ("Delhi", "India"),
    ("Shanghai", "China"),
    ("Sao Paulo", "Brazil"),
    ("Mexico City", "Mexico"),
    ("Cairo", "Egypt"),
    ("Mumbai", "India"),
    ("Beijing", "China"),
    ("Dhaka", "Bangladesh"),
    ("Osaka", "Japan"),
    ("New York", "United States"),
    ("Karachi", "Pakistan"),
    ("Buenos Aires", "Argentina"),
    ("Chongqing", "China"),
    ("Istanbul", "Turkey"),
    ("Kolkata", "India"),
    ("Manila", "Philippines"),
    ("Lagos", "Nigeria"),
    ("Rio de Janeiro", "Brazil"),
    ("Tianjin", "China"),
    ("Kinshasa", "DR Congo"),
    ("Guangzhou", "China"),
    ("Los Angeles", "United States"),
    ("Moscow", "Russia"),
    ("Shenzhen", "China"),
    ("Lahore", "Pakistan"),
    ("Bangalore", "India"),
    ("Paris", "France"),
    ("Bogota", "Colombia"),
    ("Jakarta", "Indonesia"),
    ("Chennai", "India"),
    ("Lima", "Peru"),
    ("Bangkok", "Thailand"),
    ("Seoul", "South Korea"),
    ("Nagoya", "Japan"),
    ("Hyderabad", "India"),
    ("London", "United Kingdom"),
    ("Tehran", "Iran"),
    ("Chicago", "United States"),
    ("Chengdu", "China"),
    ("Nanjing", "China"),
    ("Wuhan", "China"),
    ("Ho Chi Minh City", "Vietnam"),
    ("Luanda", "Angola"),
    ("Ahmedabad", "India"),
    ("Kuala Lumpur", "Malaysia"),
    ("Xi'an", "China"),
    ("Hong Kong", "China"),
    ("Dongguan", "China"),
    ("Hangzhou", "China"),
    ("Foshan", "China"),
    ("Shenyang", "China"),
    ("Riyadh", "Saudi Arabia"),
    ("Baghdad", "Iraq"),
    ("Santiago", "Chile"),
    ("Surat", "India"),
    ("Madrid", "Spain"),
    ("Suzhou", "China"),
    ("Pune", "India"),
    ("Harbin", "China"),
    ("Houston", "United States"),
    ("Dallas", "United States"),
    ("Toronto", "Canada"),
    ("Dar es Salaam", "Tanzania"),
    ("Miami", "United States"),
    ("Belo Horizonte", "Brazil"),
    ("Singapore", "Singapore"),
    ("Philadelphia", "United States"),
    ("Atlanta", "United States"),
    ("Fukuoka", "Japan"),
    ("Khartoum", "Sudan"),
    ("Barcelona", "Spain"),
    ("Johannesburg", "South Africa"),
    ("Saint Petersburg", "Russia"),
    ("Qingdao", "China"),
    ("Dalian", "China"),
    ("Washington", "United States"),
    ("Yangon", "Myanmar"),
    ("Alexandria", "Egypt"),
    ("Jinan", "China"),
    ("Guadalajara", "Mexico"),
    ("Abidjan", "Ivory Coast"),
    ("Ankara", "Turkey"),
    ("Chittagong", "Bangladesh"),
    ("Melbourne", "Australia"),
    ("Sydney", "Australia"),
    ("Monterrey", "Mexico"),
    ("Nairobi", "Kenya"),
    ("Hanoi", "Vietnam"),
    ("Brasilia", "Brazil"),
    ("Cape Town", "South Africa"),
    ("Jeddah", "Saudi Arabia"),
    ("Casablanca", "Morocco"),
    ("Kabul", "Afghanistan"),
    ("Rome", "Italy"),
    ("Berlin", "Germany"),
    ("Montreal", "Canada"),
    ("Recife", "Brazil"),
    ("Porto Alegre", "Brazil"),
    ("Fortaleza", "Brazil"),
    ("Salvador", "Brazil"),
    ("Medellin", "Colombia"),
    ("Boston", "United States"),
    ("Phoenix", "United States"),
    ("Detroit", "United States"),
    ("Seattle", "United States"),
    ("San Francisco", "United States"),
    ("San Diego", "United States"),
    ("Denver", "United States"),
    ("Austin", "United States"),
    ("Portland", "United States"),
    ("Vancouver", "Canada"),
    ("Calgary", "Canada"),
    ("Ottawa", "Canada"),
    ("Havana", "Cuba"),
    ("Caracas", "Venezuela"),
    ("Quito", "Ecuador"),
    ("La Paz", "Bolivia"),
    ("Montevideo", "Uruguay"),
    ("Asuncion", "Paraguay"),
    ("Panama City", "Panama"),
    ("San Jose", "Costa Rica"),
    ("Guatemala City", "Guatemala"),
    ("Santo Domingo", "Dominican Republic"),
    ("Kingston", "Jamaica"),
    ("Accra", "Ghana"),
    ("Addis Ababa", "Ethiopia"),
    ("Dakar", "Senegal"),
    ("Kampala", "Uganda"),
    ("Algiers", "Algeria"),
    ("Tunis", "Tunisia"),
    ("Tripoli", "Libya"),
    ("Harare", "Zimbabwe"),
    ("Lusaka", "Zambia"),
    ("Maputo", "Mozambique"),
    ("Antananarivo", "Madagascar"),
    ("Durban", "South Africa"),
    ("Marrakesh", "Morocco"),
    ("Amsterdam", "Netherlands"),
    ("Rotterdam", "Netherlands"),
    ("Brussels", "Belgium"),
    ("Antwerp", "Belgium"),
    ("Vienna", "Austria"),
    ("Zurich", "Switzerland"),
    ("Geneva", "Switzerland"),
    ("Munich", "Germany"),
    ("Hamburg", "Germany"),
    ("Frankfurt", "Germany"),
    ("Cologne", "Germany"),
    ("Milan", "Italy"),
    ("Naples", "Italy"),
    ("Turin", "Italy"),
    ("Florence", "Italy"),
    ("Venice", "Italy"),
    ("Lisbon", "Portugal"),
    ("Porto", "Portugal"),
    ("Seville", "Spain"),
    ("Valencia", "Spain"),
    ("Bilbao", "Spain"),
    ("Lyon", "France"),
    ("Marseille", "France"),
    ("Toulouse", "France"),
    ("Nice", "France"),
    ("Dublin", "Ireland"),
    ("Edinburgh", "United Kingdom"),
    ("Manchester", "United Kingdom"),
    ("Birmingham", "United Kingdom"),
    ("Glasgow", "United Kingdom"),
    ("Copenhagen", "Denmark"),
    ("Stockholm", "Sweden"),
    ("Gothenburg", "Sweden"),
    ("Oslo", "Norway"),
    ("Bergen", "Norway"),
    ("Helsinki", "Finland"),
    ("Reykjavik", "Iceland"),
    ("Tallinn", "Estonia"),
    ("Riga", "Latvia"),
    ("Vilnius", "Lithuania"),
    ("Warsaw", "Poland"),
    ("Krakow", "Poland"),
    ("Prague", "Czech Republic"),
    ("Brno", "Czech Republic"),
    ("Budapest", "Hungary"),
    ("Bratislava", "Slovakia"),
    ("Ljubljana", "Slovenia"),
    ("Zagreb", "Croatia"),
    ("Belgrade", "Serbia"),
    ("Sarajevo", "Bosnia and Herzegovina"),
    ("Sofia", "Bulgaria"),
    ("Bucharest", "Romania"),
    ("Athens", "Greece"),
    ("Thessaloniki", "Greece"),
    ("Kyiv", "Ukraine"),
    ("Kharkiv", "Ukraine"),
    ("Odesa", "Ukraine"),
    ("Minsk", "Belarus"),
    ("Chisinau", "Moldova"),
    ("Tbilisi", "Georgia"),
    ("Yerevan", "Armenia"),
    ("Baku", "Azerbaijan"),
    ("Almaty", "Kazakhstan"),
    ("Tashkent", "Uzbekistan"),
    ("Novosibirsk", "Russia"),
    ("Yekaterinburg", "Russia"),
    ("Kazan", "Russia"),
    ("Vladivostok", "Russia"),
    ("Ulaanbaatar", "Mongolia"),
    ("Kathmandu", "Nepal"),
    ("Colombo", "Sri Lanka"),
    ("Islamabad", "Pakistan"),
    ("Jaipur", "India"),
    ("Lucknow", "India"),
    ("Kochi", "India"),
    ("Taipei", "Taiwan"),
    ("Kaohsiung", "Taiwan"),
    ("Busan", "South Korea"),
    ("Incheon", "South Korea"),
    ("Sapporo", "Japan"),
    ("Kyoto", "Japan"),
    ("Yokohama", "Japan"),
    ("Kobe", "Japan"),
    ("Hiroshima", "Japan"),
    ("Cebu", "Philippines"),
    ("Davao", "Philippines"),
    ("Surabaya", "Indonesia"),
    ("Bandung", "Indonesia"),
    ("Denpasar", "Indonesia"),
    ("Phnom Penh", "Cambodia"),
    ("Vientiane", "Laos"),
    ("Chiang Mai", "Thailand"),
    ("Penang", "Malaysia"),
    ("Perth", "Australia"),
    ("Brisbane", "Australia"),
    ("Adelaide", "Australia"),
    ("Auckland", "New Zealand"),
    ("Wellington", "New Zealand"),
    ("Christchurch", "New Zealand"),
    ("Honolulu", "United States"),
    ("Anchorage", "United States"),
    ("Dubai", "United Arab Emirates"),
    ("Abu Dhabi", "United Arab Emirates"),
    ("Doha", "Qatar"),
    ("Muscat", "Oman"),
    ("Kuwait City", "Kuwait"),
    ("Amman", "Jordan"),
    ("Beirut", "Lebanon"),
    ("Jerusalem", "Israel"),
    ("Tel Aviv", "Israel"),
    ("Damascus", "Syria"),
    ("Izmir", "Turkey"),
];

/// Every known city, in table order. Ids are 1-based table positions.
pub fn all_cities() -> &'static [City] {
    static CITIES: OnceLock<Vec<City>> = OnceLock::new();
    CITIES.get_or_init(|| {
        CITY_TABLE
            .iter()
            .zip(1u32..)
            .map(|(&(name, country), id)| City { id, name, country })
            .collect()
    })
}
