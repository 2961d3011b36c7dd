//! services/api/src/i18n.rs
//!
//! Locale negotiation and the catalog of user-facing error messages.
//!
//! The request locale is resolved from, in order: the `lng` query parameter,
//! the `i18next` cookie, the `Accept-Language` header, and finally the
//! configured default. Only configured locales are ever selected.

use axum::extract::Query;
use axum::http::{header, HeaderMap, Uri};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    En,
    Hi,
    Bn,
    Or,
    Mr,
    Ta,
    Te,
}

impl Locale {
    pub const ALL: [Locale; 7] = [
        Locale::En,
        Locale::Hi,
        Locale::Bn,
        Locale::Or,
        Locale::Mr,
        Locale::Ta,
        Locale::Te,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Hi => "hi",
            Locale::Bn => "bn",
            Locale::Or => "or",
            Locale::Mr => "mr",
            Locale::Ta => "ta",
            Locale::Te => "te",
        }
    }

    /// The English name of the language, as used in model prompts.
    pub fn language_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Hi => "Hindi",
            Locale::Bn => "Bengali",
            Locale::Or => "Odia",
            Locale::Mr => "Marathi",
            Locale::Ta => "Tamil",
            Locale::Te => "Telugu",
        }
    }

    /// Matches the primary subtag of a language tag (`hi-IN` -> `hi`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        Locale::ALL.into_iter().find(|l| l.code() == primary)
    }

    pub fn message(self, key: MessageKey) -> &'static str {
        let table = match self {
            Locale::En => &EN,
            Locale::Hi => &HI,
            Locale::Bn => &BN,
            Locale::Or => &OR,
            Locale::Mr => &MR,
            Locale::Ta => &TA,
            Locale::Te => &TE,
        };
        table[key as usize]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| format!("'{}' is not a supported locale", s))
    }
}

//=========================================================================================
// Negotiation
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSettings {
    pub default: Locale,
    pub supported: Vec<Locale>,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            default: Locale::En,
            supported: Locale::ALL.to_vec(),
        }
    }
}

#[derive(Deserialize)]
struct LocaleQuery {
    lng: Option<String>,
}

impl LocaleSettings {
    fn accept(&self, tag: &str) -> Option<Locale> {
        Locale::from_tag(tag).filter(|l| self.supported.contains(l))
    }

    pub fn negotiate(
        &self,
        query: Option<&str>,
        cookie: Option<&str>,
        accept_language: Option<&str>,
    ) -> Locale {
        query
            .and_then(|q| self.accept(q))
            .or_else(|| cookie.and_then(|c| self.accept(c)))
            .or_else(|| accept_language.and_then(|h| self.from_accept_language(h)))
            .unwrap_or(self.default)
    }

    /// Picks the highest-weighted supported language from an `Accept-Language` value.
    fn from_accept_language(&self, header_value: &str) -> Option<Locale> {
        let mut ranked: Vec<(f32, &str)> = header_value
            .split(',')
            .filter_map(|entry| {
                let mut parts = entry.split(';');
                let tag = parts.next()?.trim();
                let weight = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                (!tag.is_empty() && weight > 0.0).then_some((weight, tag))
            })
            .collect();
        // Stable sort keeps header order among equal weights.
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        ranked.into_iter().find_map(|(_, tag)| self.accept(tag))
    }

    pub fn resolve(&self, headers: &HeaderMap, uri: &Uri) -> Locale {
        let query = Query::<LocaleQuery>::try_from_uri(uri)
            .ok()
            .and_then(|Query(q)| q.lng);
        let cookie = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .find_map(|c| c.trim().strip_prefix("i18next="));
        let accept_language = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        self.negotiate(query.as_deref(), cookie, accept_language)
    }
}

//=========================================================================================
// Message Catalog
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    NoImageFile = 0,
    ImageDataMissing,
    InvalidRequest,
    MessageOrImageRequired,
    AnalysisFailed,
    ReportFailed,
    ValuationFailed,
    AssistantFailed,
    SaveError,
    AnalysisNotFound,
    NotAuthorized,
    ServerError,
    InvalidCredentials,
    UserExists,
}

const MESSAGE_COUNT: usize = 14;

type Catalog = [&'static str; MESSAGE_COUNT];

const EN: Catalog = [
    "No image file was uploaded.",
    "Image data is missing.",
    "The request is invalid. Please check the submitted details.",
    "A message or an image is required.",
    "Breed analysis failed. Please try again.",
    "Failed to generate AI report.",
    "Failed to generate valuation.",
    "Failed to get AI assistant response.",
    "Failed to save the analysis. The generated report was not stored.",
    "Analysis not found.",
    "Not authorized. Please log in.",
    "Server error. Please try again later.",
    "Invalid email or password.",
    "An account with this email already exists.",
];

const HI: Catalog = [
    "कोई छवि फ़ाइल अपलोड नहीं की गई।",
    "छवि डेटा उपलब्ध नहीं है।",
    "अनुरोध अमान्य है। कृपया दी गई जानकारी जाँचें।",
    "एक संदेश या छवि आवश्यक है।",
    "नस्ल विश्लेषण विफल रहा। कृपया पुनः प्रयास करें।",
    "एआई रिपोर्ट बनाने में विफल।",
    "मूल्यांकन बनाने में विफल।",
    "एआई सहायक से उत्तर प्राप्त करने में विफल।",
    "विश्लेषण सहेजने में विफल। बनाई गई रिपोर्ट संग्रहीत नहीं हुई।",
    "विश्लेषण नहीं मिला।",
    "अधिकृत नहीं। कृपया लॉग इन करें।",
    "सर्वर त्रुटि। कृपया बाद में पुनः प्रयास करें।",
    "अमान्य ईमेल या पासवर्ड।",
    "इस ईमेल से पहले से एक खाता मौजूद है।",
];

const BN: Catalog = [
    "কোনো ছবি ফাইল আপলোড করা হয়নি।",
    "ছবির ডেটা পাওয়া যায়নি।",
    "অনুরোধটি সঠিক নয়। অনুগ্রহ করে তথ্য যাচাই করুন।",
    "একটি বার্তা বা একটি ছবি প্রয়োজন।",
    "জাত বিশ্লেষণ ব্যর্থ হয়েছে। আবার চেষ্টা করুন।",
    "এআই রিপোর্ট তৈরি করা যায়নি।",
    "মূল্যায়ন তৈরি করা যায়নি।",
    "এআই সহকারীর উত্তর পাওয়া যায়নি।",
    "বিশ্লেষণ সংরক্ষণ করা যায়নি। তৈরি রিপোর্টটি সংরক্ষিত হয়নি।",
    "বিশ্লেষণ পাওয়া যায়নি।",
    "অনুমোদিত নয়। অনুগ্রহ করে লগ ইন করুন।",
    "সার্ভার ত্রুটি। পরে আবার চেষ্টা করুন।",
    "ভুল ইমেল বা পাসওয়ার্ড।",
    "এই ইমেল দিয়ে ইতিমধ্যে একটি অ্যাকাউন্ট আছে।",
];

const OR: Catalog = [
    "କୌଣସି ଛବି ଫାଇଲ ଅପଲୋଡ୍ ହୋଇନାହିଁ।",
    "ଛବି ତଥ୍ୟ ମିଳିଲା ନାହିଁ।",
    "ଅନୁରୋଧ ଅବୈଧ। ଦୟାକରି ବିବରଣୀ ଯାଞ୍ଚ କରନ୍ତୁ।",
    "ଏକ ବାର୍ତ୍ତା କିମ୍ବା ଛବି ଆବଶ୍ୟକ।",
    "ପ୍ରଜାତି ବିଶ୍ଳେଷଣ ବିଫଳ ହେଲା। ପୁଣି ଚେଷ୍ଟା କରନ୍ତୁ।",
    "AI ରିପୋର୍ଟ ପ୍ରସ୍ତୁତ କରିବାରେ ବିଫଳ।",
    "ମୂଲ୍ୟାଙ୍କନ ପ୍ରସ୍ତୁତ କରିବାରେ ବିଫଳ।",
    "AI ସହାୟକଙ୍କ ଉତ୍ତର ମିଳିଲା ନାହିଁ।",
    "ବିଶ୍ଳେଷଣ ସେଭ୍ ହୋଇପାରିଲା ନାହିଁ। ପ୍ରସ୍ତୁତ ରିପୋର୍ଟ ସଂରକ୍ଷିତ ହୋଇନାହିଁ।",
    "ବିଶ୍ଳେଷଣ ମିଳିଲା ନାହିଁ।",
    "ଅନୁମତି ନାହିଁ। ଦୟାକରି ଲଗ୍ ଇନ୍ କରନ୍ତୁ।",
    "ସର୍ଭର ତ୍ରୁଟି। ପରେ ପୁଣି ଚେଷ୍ଟା କରନ୍ତୁ।",
    "ଭୁଲ ଇମେଲ କିମ୍ବା ପାସୱାର୍ଡ।",
    "ଏହି ଇମେଲରେ ପୂର୍ବରୁ ଏକ ଆକାଉଣ୍ଟ ଅଛି।",
];

const MR: Catalog = [
    "कोणतीही प्रतिमा फाइल अपलोड केलेली नाही.",
    "प्रतिमेचा डेटा उपलब्ध नाही.",
    "विनंती अवैध आहे. कृपया दिलेली माहिती तपासा.",
    "संदेश किंवा प्रतिमा आवश्यक आहे.",
    "जातीचे विश्लेषण अयशस्वी झाले. कृपया पुन्हा प्रयत्न करा.",
    "एआय अहवाल तयार करता आला नाही.",
    "मूल्यांकन तयार करता आले नाही.",
    "एआय सहाय्यकाकडून उत्तर मिळाले नाही.",
    "विश्लेषण जतन करता आले नाही. तयार केलेला अहवाल साठवला गेला नाही.",
    "विश्लेषण सापडले नाही.",
    "अधिकृत नाही. कृपया लॉग इन करा.",
    "सर्व्हर त्रुटी. कृपया नंतर पुन्हा प्रयत्न करा.",
    "अवैध ईमेल किंवा पासवर्ड.",
    "या ईमेलसह आधीच खाते अस्तित्वात आहे.",
];

const TA: Catalog = [
    "படக் கோப்பு எதுவும் பதிவேற்றப்படவில்லை.",
    "படத் தரவு இல்லை.",
    "கோரிக்கை தவறானது. வழங்கிய விவரங்களைச் சரிபார்க்கவும்.",
    "ஒரு செய்தி அல்லது படம் தேவை.",
    "இன பகுப்பாய்வு தோல்வியடைந்தது. மீண்டும் முயற்சிக்கவும்.",
    "AI அறிக்கையை உருவாக்க முடியவில்லை.",
    "மதிப்பீட்டை உருவாக்க முடியவில்லை.",
    "AI உதவியாளரிடமிருந்து பதில் பெற முடியவில்லை.",
    "பகுப்பாய்வைச் சேமிக்க முடியவில்லை. உருவாக்கிய அறிக்கை சேமிக்கப்படவில்லை.",
    "பகுப்பாய்வு கிடைக்கவில்லை.",
    "அங்கீகாரம் இல்லை. உள்நுழையவும்.",
    "சேவையகப் பிழை. பின்னர் மீண்டும் முயற்சிக்கவும்.",
    "தவறான மின்னஞ்சல் அல்லது கடவுச்சொல்.",
    "இந்த மின்னஞ்சலுடன் ஏற்கனவே ஒரு கணக்கு உள்ளது.",
];

const TE: Catalog = [
    "చిత్ర ఫైల్ ఏదీ అప్‌లోడ్ చేయలేదు.",
    "చిత్ర డేటా లేదు.",
    "అభ్యర్థన చెల్లదు. ఇచ్చిన వివరాలను తనిఖీ చేయండి.",
    "సందేశం లేదా చిత్రం అవసరం.",
    "జాతి విశ్లేషణ విఫలమైంది. మళ్లీ ప్రయత్నించండి.",
    "AI నివేదికను రూపొందించడం విఫలమైంది.",
    "విలువ అంచనాను రూపొందించడం విఫలమైంది.",
    "AI సహాయకుడి నుండి సమాధానం పొందడం విఫలమైంది.",
    "విశ్లేషణను సేవ్ చేయడం విఫలమైంది. రూపొందించిన నివేదిక నిల్వ కాలేదు.",
    "విశ్లేషణ కనుగొనబడలేదు.",
    "అనుమతి లేదు. దయచేసి లాగిన్ అవ్వండి.",
    "సర్వర్ లోపం. తర్వాత మళ్లీ ప్రయత్నించండి.",
    "చెల్లని ఇమెయిల్ లేదా పాస్‌వర్డ్.",
    "ఈ ఇమెయిల్‌తో ఇప్పటికే ఒక ఖాతా ఉంది.",
];

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn query_beats_cookie_beats_header() {
        let settings = LocaleSettings::default();
        assert_eq!(settings.negotiate(Some("hi"), Some("ta"), Some("bn")), Locale::Hi);
        assert_eq!(settings.negotiate(None, Some("ta"), Some("bn")), Locale::Ta);
        assert_eq!(settings.negotiate(None, None, Some("bn-IN")), Locale::Bn);
        assert_eq!(settings.negotiate(None, None, None), Locale::En);
    }

    #[test]
    fn unsupported_values_fall_through_to_the_next_detector() {
        let settings = LocaleSettings {
            default: Locale::Hi,
            supported: vec![Locale::Hi, Locale::En],
        };
        assert_eq!(settings.negotiate(Some("fr"), Some("ta"), Some("en-GB")), Locale::En);
        assert_eq!(settings.negotiate(Some("xx"), None, Some("de")), Locale::Hi);
    }

    #[test]
    fn accept_language_honours_weights() {
        let settings = LocaleSettings::default();
        assert_eq!(
            settings.negotiate(None, None, Some("de;q=1.0, mr;q=0.4, te-IN;q=0.8")),
            Locale::Te
        );
        assert_eq!(settings.negotiate(None, None, Some("or;q=0, ta")), Locale::Ta);
    }

    #[test]
    fn resolves_from_request_parts() {
        let settings = LocaleSettings::default();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc; i18next=mr"));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("hi"));

        let uri: Uri = "/api/analyses?lng=or".parse().unwrap();
        assert_eq!(settings.resolve(&headers, &uri), Locale::Or);

        let uri: Uri = "/api/analyses".parse().unwrap();
        assert_eq!(settings.resolve(&headers, &uri), Locale::Mr);
    }

    #[test]
    fn locale_cookie_is_found_in_a_later_cookie_header() {
        let settings = LocaleSettings::default();
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("session=abc"));
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; i18next=bn"));

        let uri: Uri = "/api/analyses".parse().unwrap();
        assert_eq!(settings.resolve(&headers, &uri), Locale::Bn);
    }

    #[test]
    fn every_locale_has_every_message() {
        for locale in Locale::ALL {
            for index in 0..MESSAGE_COUNT {
                let table = match locale {
                    Locale::En => &EN,
                    Locale::Hi => &HI,
                    Locale::Bn => &BN,
                    Locale::Or => &OR,
                    Locale::Mr => &MR,
                    Locale::Ta => &TA,
                    Locale::Te => &TE,
                };
                assert!(!table[index].trim().is_empty(), "{locale} #{index}");
            }
        }
        assert_eq!(Locale::Hi.message(MessageKey::AnalysisNotFound), "विश्लेषण नहीं मिला।");
        assert_eq!(Locale::En.message(MessageKey::UserExists), EN[MESSAGE_COUNT - 1]);
    }

    #[test]
    fn parses_tags() {
        assert_eq!("te_IN".parse::<Locale>(), Ok(Locale::Te));
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!(Locale::Or.language_name(), "Odia");
    }
}
