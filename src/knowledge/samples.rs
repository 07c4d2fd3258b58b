//! 기본 지식베이스 - 고객 지원 문서 샘플

use super::document::NewDocument;
use super::store::KnowledgeStore;
use crate::error::KnowledgeResult;

/// (제목, 카테고리, 태그, 본문)
const SAMPLES: &[(&str, &str, &[&str], &str)] = &[
    (
        "Billing FAQ - How to Check Your Bill",
        "billing",
        &["billing", "faq", "payment", "invoice"],
        "To check your current bill, sign in to your account, open the Billing section \
         and choose View Current Bill. Itemized charges and the payment due date are shown there. \
         Bills are generated on the 1st of every month and up to 12 months of billing history \
         stay available. Accepted payment methods: credit or debit card, bank transfer, wire \
         transfer and check by mail. A late fee applies when payment arrives after the due date; \
         automatic payments help avoid missed deadlines. Questions about specific charges go to \
         the billing department.",
    ),
    (
        "Common Technical Issues and Solutions",
        "technical",
        &["technical", "troubleshooting", "support", "browser"],
        "Connection problems: restart your device, check your internet connection speed, try a \
         different network, disable any VPN temporarily and clear the browser cache and cookies. \
         If the issue remains, update your browser, disable extensions one at a time, try another \
         device and check the service status page. Performance problems: close unused \
         applications, free device storage, reduce open tabs or try private mode. Supported \
         browsers: Chrome 90+, Firefox 88+, Safari 14+, Edge 90+. When contacting technical \
         support include your device model, browser version, any error message and the time \
         the issue occurred.",
    ),
    (
        "Account Security and Management",
        "account",
        &["security", "account", "privacy", "password"],
        "Use a password of at least 12 characters mixing uppercase, lowercase, numbers and \
         special characters, avoid personal information and change it every 90 days. Never \
         share your password. Enable two-factor authentication under Account Settings > \
         Security using SMS, email or an authenticator app. We never ask for passwords by email; \
         report suspicious messages to the security team. If your account is compromised, \
         reset your password immediately, enable two-factor authentication, review recent \
         activity and linked payment methods, and contact support about unauthorized charges.",
    ),
    (
        "Subscription Plans and Pricing",
        "billing",
        &["pricing", "plans", "subscription", "billing"],
        "Basic plan costs $9.99 per month with 5 projects, 5GB storage and email support. \
         Professional plan costs $29.99 per month with 50 projects, 100GB storage, priority \
         email support, phone support during business hours and advanced analytics. Enterprise \
         plan has custom pricing with unlimited projects and storage, 24/7 dedicated support, \
         custom integrations and an SLA. Plans can be cancelled, upgraded or downgraded at any \
         time with no setup fees and a 30-day free trial. Annual billing receives a 15% discount.",
    ),
    (
        "Getting Started Guide",
        "general",
        &["getting-started", "onboarding", "tutorial", "help"],
        "Create your account from the Sign Up page, verify your email and complete your \
         profile. Set up your first project from the Dashboard with New Project, name it, \
         choose a plan and configure settings. Invite team members from Project Settings and \
         set their permission levels. Explore the documentation, tutorial videos and webinars. \
         For help read the FAQ, browse the knowledge base, join the community forum or contact \
         the support team by email, phone or live chat.",
    ),
];

/// 샘플 문서 목록
pub fn sample_documents() -> Vec<NewDocument> {
    SAMPLES
        .iter()
        .map(|(title, category, tags, content)| NewDocument {
            title: title.to_string(),
            content: content.to_string(),
            category: Some(category.to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        })
        .collect()
}

/// 샘플 문서 적재
///
/// 저장소가 비어 있지 않으면 `force`가 없는 한 건너뜁니다. 추가된 문서 수를 반환합니다.
pub fn seed_samples(store: &KnowledgeStore, force: bool) -> KnowledgeResult<usize> {
    if !force && !store.is_empty() {
        tracing::info!("Knowledge base already has {} documents, skipping samples", store.len());
        return Ok(0);
    }

    let mut added = 0;
    for doc in sample_documents() {
        store.add_document(doc)?;
        added += 1;
    }

    tracing::info!("Seeded {} sample documents", added);
    Ok(added)
}

// ============================================================================
// Tests
// ============================================================================
